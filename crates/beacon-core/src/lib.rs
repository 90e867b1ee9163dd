//! Shared domain types and configuration for the Beacon visibility scanner.
//!
//! Holds the `ProductProfile` input model, plan tiers with their scan
//! limits, the quota state machine, and the env-derived `AppConfig` used
//! by the server and CLI binaries.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod plan;
pub mod profile;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use plan::{PlanLimits, PlanTier, QuotaDecision, QuotaState};
pub use profile::{load_profile, ProductProfile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read profile file {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile file: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
