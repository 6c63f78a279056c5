use std::path::Path;

use tokio::io::AsyncBufReadExt;

use crate::constants::{PRIVATE_KEYS_FILE_PATH, PROXIES_FILE_PATH};

pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let file = tokio::fs::read(path).await?;
    let mut lines = file.lines();

    let mut contents = vec![];
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            contents.push(trimmed.to_string());
        }
    }

    Ok(contents)
}

/// Keys are kept as raw strings here; malformed ones are surfaced as
/// per-wallet outcomes during the run instead of failing the load.
pub async fn read_private_keys() -> eyre::Result<Vec<String>> {
    read_file_lines(PRIVATE_KEYS_FILE_PATH)
        .await
        .map_err(|e| eyre::eyre!("Failed to read {PRIVATE_KEYS_FILE_PATH}: {e}"))
}

/// The proxy list is optional; a missing file means direct connections.
pub async fn read_proxies() -> Vec<String> {
    read_file_lines(PROXIES_FILE_PATH).await.unwrap_or_default()
}
