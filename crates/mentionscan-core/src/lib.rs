//! Shared domain types and configuration for mentionscan.
//!
//! Holds the platform/sentiment/mention vocabulary the connectors and the
//! search core exchange, plus env-driven application configuration with
//! range validation.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod mention;
pub mod query;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use mention::{ContentType, Engagement, Mention, Platform, Sentiment};
pub use query::{FilterSpec, Period, SearchRequest};

/// Parse failures for the closed domain vocabularies.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown sentiment: {0}")]
    UnknownSentiment(String),

    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    #[error("unknown period: {0}")]
    UnknownPeriod(String),
}

/// Configuration load failures, reported before the search core starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("{var} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        var: String,
        value: u64,
        min: u64,
        max: u64,
    },
}
