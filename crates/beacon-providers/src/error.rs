use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    #[error("malformed response from {provider}: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned an empty completion")]
    EmptyCompletion { provider: &'static str },
}
