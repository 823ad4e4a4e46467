//! Retry mechanism with capped exponential backoff

use super::types::RetryConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry mechanism with capped exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self
            .config
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let millis = self.config.base_delay.as_millis() as f64 * factor;
        std::cmp::min(
            Duration::from_millis(millis as u64),
            self.config.max_delay,
        )
    }

    /// Execute a function with retry logic
    pub async fn call<F, Fut, R, E>(&self, f: F) -> std::result::Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<R, E>>,
        E: std::fmt::Display + std::fmt::Debug,
    {
        self.call_if(f, |_| true).await
    }

    /// Execute a function with retry logic, giving up at once on errors
    /// `retryable` rejects
    pub async fn call_if<F, Fut, R, E, P>(
        &self,
        mut f: F,
        retryable: P,
    ) -> std::result::Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<R, E>>,
        E: std::fmt::Display + std::fmt::Debug,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("Retry succeeded on attempt {}", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !retryable(&error) {
                        warn!("Not retrying: {}", error);
                        return Err(error);
                    }
                    if attempt >= max_attempts {
                        warn!("Giving up after {} attempts: {}", attempt, error);
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt);
                    let actual_delay = if self.config.jitter {
                        let jitter = delay.as_millis() as f64 * 0.1 * (rand::random::<f64>() - 0.5);
                        Duration::from_millis((delay.as_millis() as f64 + jitter) as u64)
                    } else {
                        delay
                    };

                    debug!(
                        "Attempt {} failed: {}, retrying in {:?}",
                        attempt, error, actual_delay
                    );
                    tokio::time::sleep(actual_delay).await;
                }
            }
        }
    }
}
