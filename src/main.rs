use std::sync::Arc;

use og_drop_checker::{
    config::Config,
    constants::{ELIGIBLE_FILE_PATH, NOT_ELIGIBLE_FILE_PATH},
    logger::init_default_logger,
    runner::{log_summary, run_batch},
    utils::{read_private_keys, read_proxies},
    writer::write_results,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_default_logger();

    let config = Config::read_default()
        .await
        .inspect_err(|e| tracing::error!("Failed to load config: {e}"))?;

    let keys = read_private_keys()
        .await
        .inspect_err(|e| tracing::error!("{e}"))?;
    let proxies = read_proxies().await;

    let outcomes = run_batch(keys, proxies, Arc::new(config))
        .await
        .inspect_err(|e| tracing::error!("Run aborted: {e}"))?;

    write_results(&outcomes, ELIGIBLE_FILE_PATH, NOT_ELIGIBLE_FILE_PATH).await;
    log_summary(&outcomes);

    Ok(())
}
