use std::{future::Future, time::Duration};

use rand::Rng;

use crate::config::RetryOptions;

/// Retry budget shared by every retried operation in a run.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn from_options(options: RetryOptions) -> Self {
        Self {
            max_retries: options.retries,
            min_backoff_ms: options.min_timeout,
            max_backoff_ms: options.max_timeout,
        }
    }

    /// Jittered exponential backoff before retry number `attempt` (1-based).
    /// `unit` is a uniform sample from [0, 1); keeping it a parameter keeps
    /// the math deterministic under test.
    pub fn backoff_for(&self, attempt: u32, unit: f64) -> Duration {
        let exp = 2f64.powi(attempt.min(32) as i32);
        let jittered = (unit * exp * self.min_backoff_ms as f64).round() as u64;
        Duration::from_millis(jittered.min(self.max_backoff_ms))
    }
}

/// Runs `op` until it succeeds or the retry budget is exhausted, sleeping a
/// jittered exponential backoff between attempts. With `max_retries == 0` the
/// operation runs exactly once and any failure propagates immediately.
pub async fn run_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt > policy.max_retries {
                    return Err(err);
                }

                let backoff = policy.backoff_for(attempt, rand::thread_rng().gen::<f64>());
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
