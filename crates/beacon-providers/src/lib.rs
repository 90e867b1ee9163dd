//! AI completion provider clients for the Beacon scan pipeline.
//!
//! Each provider implements the [`AiProvider`] trait: one prompt in, one
//! completion text out. Clients share the same retry policy (exponential
//! backoff on 429s, 5xx and network failures) and surface everything else
//! as a typed [`ProviderError`]. [`build_providers`] assembles the set of
//! configured providers from [`AppConfig`] — a provider without an API key
//! is simply absent.

use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::AppConfig;

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod openai;
mod retry;

pub use anthropic::AnthropicProvider;
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// A completion backend. Implementations must be cheap to share across
/// tasks; the scan pipeline holds them behind `Arc<dyn AiProvider>`.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Stable lowercase identifier, used in scoring output and logs.
    fn name(&self) -> &'static str;

    /// Sends `prompt` and returns the completion text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, non-success status,
    /// an unparseable body, or an empty completion. Transient failures are
    /// retried internally per the client's retry policy before surfacing.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Builds one client per provider with a configured API key, in a fixed
/// order (openai, anthropic, gemini). May be empty.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if an HTTP client cannot be constructed.
pub fn build_providers(config: &AppConfig) -> Result<Vec<Arc<dyn AiProvider>>, ProviderError> {
    let timeout = config.provider_request_timeout_secs;
    let retries = config.provider_max_retries;
    let backoff = config.provider_retry_backoff_base_secs;

    let mut providers: Vec<Arc<dyn AiProvider>> = Vec::new();
    if let Some(key) = &config.openai_api_key {
        providers.push(Arc::new(OpenAiProvider::new(key, timeout, retries, backoff)?));
    }
    if let Some(key) = &config.anthropic_api_key {
        providers.push(Arc::new(AnthropicProvider::new(
            key, timeout, retries, backoff,
        )?));
    }
    if let Some(key) = &config.gemini_api_key {
        providers.push(Arc::new(GeminiProvider::new(key, timeout, retries, backoff)?));
    }
    Ok(providers)
}

/// Parses a `Retry-After` header as whole seconds, defaulting to 1.
pub(crate) fn retry_after_secs(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}
