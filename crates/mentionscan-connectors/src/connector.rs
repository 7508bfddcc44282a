//! The platform-connector capability.

use std::time::Duration;

use async_trait::async_trait;
use mentionscan_core::{FilterSpec, Mention, Platform};

use crate::error::ConnectorError;

/// A search adapter for one external platform.
///
/// Contract:
/// - `search` must return within roughly `timeout`; a call that cannot
///   complete in time yields [`ConnectorError::Timeout`] instead of blocking
///   the caller. The orchestrator additionally guards each attempt with its
///   own deadline, so a misbehaving connector cannot stall a fan-out.
/// - Ordinary external failures (non-2xx statuses, empty or unparseable
///   payloads, network errors) are returned as typed [`ConnectorError`]s,
///   never panics. Only contract violations are fatal.
/// - Every returned [`Mention`] carries [`PlatformConnector::platform`] as
///   its provenance tag.
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// The platform this connector serves; also its registry key.
    fn platform(&self) -> Platform;

    /// Execute a single-platform keyword search.
    ///
    /// `filters` may be pushed down to the source where its API supports it
    /// (language, time window); the filter pipeline re-applies every
    /// constraint afterwards, so push-down is an optimization, not a
    /// correctness requirement.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectorError`] describing the per-platform failure.
    async fn search(
        &self,
        keywords: &[String],
        filters: &FilterSpec,
        timeout: Duration,
    ) -> Result<Vec<Mention>, ConnectorError>;
}
