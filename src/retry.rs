//! Bounded retry with exponential backoff for GemChat
//!
//! A thin wrapper for repeating a fallible async operation, intended
//! for idempotent or safely-repeatable remote calls. Callers remain
//! responsible for idempotence; the wrapper never swallows a terminal
//! failure.

use crate::error::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Upper bound (exclusive) of the uniform jitter added to each backoff
const JITTER_MAX_MS: u64 = 500;

/// Execute an operation with bounded exponential-backoff retry
///
/// The first success is returned immediately. On failure, if attempts
/// remain, the wrapper sleeps for `base_delay * 2^attempt` plus a
/// uniform jitter in `[0, 500ms)` and retries. Once `max_attempts`
/// attempts have failed, the last error is returned to the caller.
///
/// # Arguments
///
/// * `operation` - Zero-argument async operation to execute
/// * `max_attempts` - Total number of attempts (at least 1)
/// * `base_delay` - Base delay for the exponential backoff
///
/// # Examples
///
/// ```
/// use gemchat::retry::retry_with_backoff;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let value = retry_with_backoff(
///     || async { Ok::<_, anyhow::Error>(42) },
///     3,
///     Duration::from_millis(100),
/// )
/// .await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<T, F, Fut>(
    mut operation: F,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);

    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Operation succeeded on attempt {}", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts {
                    tracing::error!("Operation failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }

                let delay = backoff_delay(base_delay, attempt - 1);
                tracing::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Backoff for a given zero-based attempt index: `base * 2^index` plus
/// uniform jitter in `[0, 500ms)`
fn backoff_delay(base_delay: Duration, attempt_index: u32) -> Duration {
    let exponential = base_delay.saturating_mul(1u32 << attempt_index.min(16));
    let jitter = Duration::from_millis(rand::rng().random_range(0..JITTER_MAX_MS));
    exponential + jitter
}
