use std::sync::Arc;

use rand::Rng;
use tokio::{sync::Semaphore, task::JoinSet, time::Duration};

use crate::{
    config::Config,
    eligibility::check_eligibility,
    retry::{run_with_retry, RetryPolicy},
    signer::{derive_keypair, public_key, sign_message},
};

/// Final per-wallet record. The original encoded private key is always kept
/// so wallets stay traceable in the output files even when derivation fails.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub private_key: String,
    pub public_key: String,
    pub eligible: bool,
    pub amount: f64,
    pub error: Option<String>,
}

impl Outcome {
    fn failed(private_key: String, public_key: String, error: String) -> Self {
        Self {
            private_key,
            public_key,
            eligible: false,
            amount: 0.0,
            error: Some(error),
        }
    }
}

pub fn proxy_for_index(proxies: &[String], enabled: bool, index: usize) -> Option<&str> {
    if !enabled || proxies.is_empty() {
        return None;
    }
    Some(proxies[index % proxies.len()].as_str())
}

fn short(key: &str) -> String {
    key.chars().take(8).collect()
}

/// Runs the eligibility pipeline for every wallet under an N-slot concurrency
/// gate and returns one outcome per input key, in completion order.
pub async fn run_batch(
    keys: Vec<String>,
    proxies: Vec<String>,
    config: Arc<Config>,
) -> eyre::Result<Vec<Outcome>> {
    if keys.is_empty() {
        eyre::bail!("No private keys loaded, nothing to check");
    }

    let total = keys.len();
    let policy = RetryPolicy::from_options(config.retry_options);
    let semaphore = Arc::new(Semaphore::new(config.concurrency));

    tracing::info!(
        "Checking {total} wallet(s), concurrency {}, {} prox{}",
        config.concurrency,
        proxies.len(),
        if proxies.len() == 1 { "y" } else { "ies" }
    );

    let mut handles = JoinSet::new();

    for (index, key) in keys.into_iter().enumerate() {
        let proxy = proxy_for_index(&proxies, config.enable_proxy, index).map(str::to_string);
        let config = config.clone();
        let semaphore = semaphore.clone();
        let is_last = index + 1 == total;

        handles.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore stays open for the whole run");

            let outcome = check_wallet(key, proxy.as_deref(), &config, &policy).await;

            if !is_last {
                let range = config.delay_between_accounts;
                let delay_ms = rand::thread_rng().gen_range(range.min..=range.max);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            outcome
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(res) = handles.join_next().await {
        outcomes.push(res.expect("wallet task not to panic"));
    }

    Ok(outcomes)
}

async fn check_wallet(
    private_key: String,
    proxy: Option<&str>,
    config: &Config,
    policy: &RetryPolicy,
) -> Outcome {
    let keypair = match run_with_retry(policy, || async { derive_keypair(&private_key) }).await {
        Ok(keypair) => keypair,
        Err(e) => {
            tracing::error!("[{}...] Failed to create keypair: {e}", short(&private_key));
            return Outcome::failed(
                private_key,
                "unknown".to_string(),
                "Failed to create keypair".to_string(),
            );
        }
    };
    let pubkey = public_key(&keypair);

    let attestation = match run_with_retry(policy, || async {
        sign_message(&keypair, &config.signature_message)
    })
    .await
    {
        Ok(attestation) => attestation,
        Err(e) => {
            tracing::error!("[{pubkey}] Failed to sign message: {e}");
            return Outcome::failed(private_key, pubkey, "Failed to sign message".to_string());
        }
    };

    match run_with_retry(policy, || check_eligibility(&attestation, proxy, config)).await {
        Ok(result) => {
            if result.eligible {
                tracing::info!("[{pubkey}] Eligible for {}", result.amount);
            } else {
                tracing::warn!(
                    "[{pubkey}] Not eligible: {}",
                    result.error.as_deref().unwrap_or("no reason given")
                );
            }
            Outcome {
                private_key,
                public_key: pubkey,
                eligible: result.eligible,
                amount: result.amount,
                error: result.error,
            }
        }
        Err(e) => {
            tracing::error!("[{pubkey}] Eligibility check failed: {e}");
            Outcome::failed(private_key, pubkey, e.to_string())
        }
    }
}

pub fn log_summary(outcomes: &[Outcome]) {
    let eligible = outcomes.iter().filter(|o| o.eligible).count();
    let total_amount: f64 = outcomes
        .iter()
        .filter(|o| o.eligible)
        .map(|o| o.amount)
        .sum();

    tracing::info!("Checked {} wallet(s)", outcomes.len());
    tracing::info!(
        "Eligible: {eligible}, not eligible: {}, total allocation: {total_amount}",
        outcomes.len() - eligible
    );
}
