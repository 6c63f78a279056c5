use serde::Deserialize;
use std::path::Path;

use crate::constants::CONFIG_FILE_PATH;

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub api_endpoint: String,
    pub signature_message: String,
    pub signature_token: String,
    pub user_agent: String,
    pub enable_proxy: bool,
    pub concurrency: usize,
    pub delay_between_accounts: DelayRange,
    pub retry_options: RetryOptions,
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RetryOptions {
    pub retries: u32,
    pub min_timeout: u64,
    pub max_timeout: u64,
}

impl Config {
    pub async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&cfg_str)?;
        config.validate()?;

        Ok(config)
    }

    pub async fn read_default() -> eyre::Result<Self> {
        Self::read_from_file(CONFIG_FILE_PATH).await
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.api_endpoint.trim().is_empty() {
            eyre::bail!("API_ENDPOINT must not be empty");
        }
        if reqwest::Url::parse(&self.api_endpoint).is_err() {
            eyre::bail!("API_ENDPOINT is not a valid URL: {}", self.api_endpoint);
        }
        if self.signature_message.is_empty() {
            eyre::bail!("SIGNATURE_MESSAGE must not be empty");
        }
        if self.signature_token.is_empty() {
            eyre::bail!("SIGNATURE_TOKEN must not be empty");
        }
        if self.user_agent.is_empty() {
            eyre::bail!("USER_AGENT must not be empty");
        }
        if self.concurrency == 0 {
            eyre::bail!("CONCURRENCY must be at least 1");
        }
        if self.delay_between_accounts.min > self.delay_between_accounts.max {
            eyre::bail!("DELAY_BETWEEN_ACCOUNTS.MIN must not exceed MAX");
        }
        if self.retry_options.min_timeout == 0 {
            eyre::bail!("RETRY_OPTIONS.MIN_TIMEOUT must be at least 1");
        }
        if self.retry_options.max_timeout < self.retry_options.min_timeout {
            eyre::bail!("RETRY_OPTIONS.MAX_TIMEOUT must not be below MIN_TIMEOUT");
        }

        Ok(())
    }
}
