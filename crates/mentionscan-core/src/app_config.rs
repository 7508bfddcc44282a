use std::time::Duration;

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

/// Application configuration, loaded once at startup and injected into the
/// search core. There is no process-wide singleton: the orchestrator and
/// cache take these values through their constructors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// How long a cache entry stays valid. Range `[5, 1440]` minutes.
    /// Changing this affects entries written afterwards only.
    pub cache_expiry_minutes: u32,
    /// Upper bound on simultaneously running connector calls during one
    /// fan-out. Range `[1, 20]`.
    pub max_concurrent_jobs: usize,
    /// Additional attempts after the first failure of a retriable connector
    /// call. Range `[0, 10]`.
    pub retry_attempts: u32,
    /// Per-connector-call timeout. Range `[5, 300]` seconds.
    pub timeout_seconds: u64,
    /// Base delay for exponential retry backoff, in milliseconds.
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Per-connector-call timeout as a [`Duration`].
    #[must_use]
    pub fn connector_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Default TTL for cache entries as a [`Duration`].
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_expiry_minutes) * 60)
    }
}
