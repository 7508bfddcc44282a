//! Retry with exponential back-off and jitter for connector calls.
//!
//! [`retry_with_backoff`] wraps one platform's search attempt and retries on
//! transient errors. Failures that a retry cannot fix — rejected credentials,
//! unparseable payloads — are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ConnectorError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`ConnectorError::Timeout`] — the source may simply have been slow.
/// - [`ConnectorError::RateLimited`] — the source asked us to back off.
/// - [`ConnectorError::Unreachable`] — transient network failure.
///
/// **Not retriable (hard stop):**
/// - [`ConnectorError::Unauthenticated`] — credentials won't improve by waiting.
/// - [`ConnectorError::MalformedResponse`] — the payload won't parse any better.
pub fn is_retriable(err: &ConnectorError) -> bool {
    matches!(
        err,
        ConnectorError::Timeout { .. }
            | ConnectorError::RateLimited { .. }
            | ConnectorError::Unreachable { .. }
    )
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt    |
/// |---------|------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter |
/// | 3       | 1 000 ms × 2² ± 25 % jitter |
///
/// Delay is capped at 30 s. When the source sent a `Retry-After`, that hint
/// takes precedence over the computed delay (still capped).
///
/// # Errors
///
/// Returns the final error once retries are exhausted, or the first
/// non-retriable error immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ConnectorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ConnectorError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let hinted = match &err {
                    ConnectorError::RateLimited {
                        retry_after_secs, ..
                    } if *retry_after_secs > 0 => retry_after_secs.saturating_mul(1000),
                    _ => computed,
                };
                let capped = hinted.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    platform = %err.platform(),
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient connector error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
