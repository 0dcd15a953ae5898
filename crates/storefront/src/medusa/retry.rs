//! Retry with exponential backoff for transient commerce API failures.
//!
//! Only errors classified by [`MedusaError::is_transient`] are retried:
//! network failures, HTTP 429 and HTTP 5xx. Everything else (404, other 4xx,
//! undecodable bodies) is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use super::MedusaError;

/// Run `operation`, retrying transient failures up to `max_retries` times.
///
/// The wait before retry `n` (1-based) is `backoff_base * 2^(n-1)`.
///
/// | Attempt | Sleep before attempt (base = 250 ms) |
/// |---------|--------------------------------------|
/// | 0 (initial) | none |
/// | 1 | 250 ms |
/// | 2 | 500 ms |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, MedusaError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MedusaError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() || attempt >= max_retries => return Err(err),
            Err(err) => {
                let delay = backoff_base.saturating_mul(1u32 << attempt.min(16));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Transient commerce API error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
