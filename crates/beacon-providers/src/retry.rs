//! Exponential backoff retry for transient provider errors.
//!
//! Retries network-level failures, 429s, and 5xx responses after a
//! backoff delay. Client errors (bad key, malformed body) are propagated
//! immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ProviderError::RateLimited`] — HTTP 429; the provider asked us to back off.
/// - [`ProviderError::Http`] — network-level failure (connection reset, timeout, etc.).
/// - [`ProviderError::UnexpectedStatus`] with a 5xx status — server-side hiccup.
///
/// Non-retriable errors (propagated immediately):
/// - [`ProviderError::UnexpectedStatus`] with a 4xx status — bad key or request.
/// - [`ProviderError::MalformedResponse`] — retrying won't change the body shape.
/// - [`ProviderError::EmptyCompletion`] — the model chose to say nothing.
fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::RateLimited { .. } | ProviderError::Http(_) => true,
        ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
        ProviderError::MalformedResponse { .. } | ProviderError::EmptyCompletion { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
/// Non-retriable errors are returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds, capped to avoid overflow.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient provider error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
