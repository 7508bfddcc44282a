//! Platform connectors for mentionscan.
//!
//! Defines the [`PlatformConnector`] capability each external source adapter
//! implements, the typed [`ConnectorError`] failure taxonomy, retry with
//! exponential back-off, and a registry that dispatches searches by
//! [`mentionscan_core::Platform`] instead of string comparison. Ships
//! concrete connectors for Reddit, Mastodon, and Hacker News.

pub mod connector;
pub mod error;
pub mod registry;
pub mod retry;
pub mod sources;

pub use connector::PlatformConnector;
pub use error::ConnectorError;
pub use registry::ConnectorRegistry;
pub use retry::{is_retriable, retry_with_backoff};
pub use sources::{HackerNewsConnector, MastodonConnector, RedditConnector};
