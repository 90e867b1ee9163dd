use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub provider_request_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub provider_retry_backoff_base_secs: u64,
    /// Overall wall-clock ceiling for one scan.
    pub scan_timeout_secs: u64,
    /// Worker pool size; 0 disables the queue and forces sync execution.
    pub queue_workers: usize,
    pub queue_max_retries: u32,
    pub queue_retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// Whether the async job queue is configured.
    #[must_use]
    pub fn queue_enabled(&self) -> bool {
        self.queue_workers > 0
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "provider_request_timeout_secs",
                &self.provider_request_timeout_secs,
            )
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "provider_retry_backoff_base_secs",
                &self.provider_retry_backoff_base_secs,
            )
            .field("scan_timeout_secs", &self.scan_timeout_secs)
            .field("queue_workers", &self.queue_workers)
            .field("queue_max_retries", &self.queue_max_retries)
            .field(
                "queue_retry_backoff_base_secs",
                &self.queue_retry_backoff_base_secs,
            )
            .finish()
    }
}
