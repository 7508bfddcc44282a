use thiserror::Error;

/// Request-level failures of the search core.
///
/// Per-platform connector failures never appear here: they are contained in
/// fan-out outcomes and merged into partial-failure data. Only a query that
/// cannot be executed at all, or a fan-out in which every platform failed,
/// fails the request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("all {attempted} requested platforms failed")]
    AllPlatformsFailed { attempted: usize },

    /// The spawned fan-out task itself died (panic or runtime shutdown).
    /// A programming error made visible, never an ordinary external failure.
    #[error("search fan-out task failed: {0}")]
    Fanout(String),
}
