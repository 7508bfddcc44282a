use mentionscan_core::Platform;
use thiserror::Error;

/// Typed failure of one platform search.
///
/// Ordinary external failures — HTTP errors, rate limits, unparseable
/// payloads — are values of this type, never panics. They are contained
/// inside one fan-out pass: the merge layer turns them into per-platform
/// outcome data rather than propagating them as request failures.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("{platform} search timed out after {timeout_secs}s")]
    Timeout { platform: Platform, timeout_secs: u64 },

    #[error("rate limited by {platform} (retry after {retry_after_secs}s)")]
    RateLimited {
        platform: Platform,
        retry_after_secs: u64,
    },

    #[error("authentication rejected by {platform} (status {status})")]
    Unauthenticated { platform: Platform, status: u16 },

    #[error("malformed response from {platform}: {reason}")]
    MalformedResponse { platform: Platform, reason: String },

    #[error("{platform} unreachable: {source}")]
    Unreachable {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },
}

impl ConnectorError {
    /// Platform the failure belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            ConnectorError::Timeout { platform, .. }
            | ConnectorError::RateLimited { platform, .. }
            | ConnectorError::Unauthenticated { platform, .. }
            | ConnectorError::MalformedResponse { platform, .. }
            | ConnectorError::Unreachable { platform, .. } => *platform,
        }
    }

    /// Classify a transport-level `reqwest` failure.
    ///
    /// Client-side timeouts become [`ConnectorError::Timeout`]; everything
    /// else (DNS, refused connection, TLS) is [`ConnectorError::Unreachable`].
    #[must_use]
    pub fn from_transport(
        platform: Platform,
        timeout_secs: u64,
        source: reqwest::Error,
    ) -> Self {
        if source.is_timeout() {
            ConnectorError::Timeout {
                platform,
                timeout_secs,
            }
        } else {
            ConnectorError::Unreachable { platform, source }
        }
    }
}
