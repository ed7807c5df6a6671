use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::CarrierError;

/// Exponential backoff with jitter, bounded by a retry budget.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the retry following the given 0-indexed attempt:
    /// `initial_delay * 2^attempt` plus a uniform jitter in
    /// `[0, 0.3 * exponential)` to decorrelate concurrent callers.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = (self.initial_delay.as_millis() as u64)
            .saturating_mul(2u64.saturating_pow(attempt));
        let jitter = (rand::thread_rng().gen_range(0.0..0.3) * exponential as f64) as u64;
        Duration::from_millis(exponential.saturating_add(jitter))
    }

    /// Transport failures are always retryable. A carrier response is
    /// retryable only for 408, 429 and server errors; any other client
    /// status cannot change on retry.
    pub fn is_retryable(&self, err: &CarrierError) -> bool {
        match err.status() {
            None => true,
            Some(status) => status == 408 || status == 429 || status >= 500,
        }
    }

    /// Run `operation` until it succeeds, fails fatally, or the budget of
    /// `max_retries + 1` attempts is exhausted. The propagated failure is
    /// always the last one observed, payload intact.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        mut operation: F,
        label: &str,
    ) -> Result<T, CarrierError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CarrierError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            tracing::debug!(
                label,
                attempt = attempt + 1,
                total = self.max_retries + 1,
                "executing carrier call"
            );

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(label, retries = attempt, "succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if attempt == self.max_retries {
                        tracing::error!(
                            label,
                            attempts = self.max_retries + 1,
                            error = %err,
                            "failed after exhausting retries"
                        );
                        return Err(err);
                    }

                    if !self.is_retryable(&err) {
                        tracing::error!(label, error = %err, "failed with non-retryable error");
                        return Err(err);
                    }

                    let delay = self.delay(attempt);
                    tracing::warn!(
                        label,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}
