//! End-to-end search execution: normalize, consult the cache, fan out,
//! merge, filter, cache, snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::{stream, StreamExt};
use mentionscan_connectors::{
    retry_with_backoff, ConnectorError, ConnectorRegistry, PlatformConnector,
};
use mentionscan_core::{AppConfig, Mention, Platform, SearchRequest};
use tokio::time::timeout;

use crate::cache::{await_flight, CacheEntry, Flight, FlightGuard, SearchCache};
use crate::error::SearchError;
use crate::filter;
use crate::merge::{merge, PlatformOutcome};
use crate::normalize::{normalize, CanonicalQuery, Fingerprint};
use crate::snapshot::{MentionSnapshot, MentionSnapshotStore};

/// Runtime limits for one orchestrator, sampled from configuration at
/// construction time.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Simultaneous connector calls per fan-out.
    pub max_concurrent_jobs: usize,
    /// Additional attempts after a retriable failure.
    pub retry_attempts: u32,
    /// Wall-clock budget per connector call attempt.
    pub connector_timeout: Duration,
    /// Base delay for exponential retry backoff.
    pub retry_backoff_base_ms: u64,
    /// Cache entry lifetime.
    pub cache_ttl: Duration,
}

impl SearchLimits {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_jobs: config.max_concurrent_jobs,
            retry_attempts: config.retry_attempts,
            connector_timeout: config.connector_timeout(),
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// What a caller gets back from [`SearchOrchestrator::search`].
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub fingerprint: Fingerprint,
    /// Post-filter mentions in canonical platform order.
    pub mentions: Vec<Mention>,
    /// Pre-filter mention counts for the platforms that succeeded.
    pub platform_counts: BTreeMap<Platform, usize>,
    pub failed_platforms: Vec<Platform>,
    pub partial_failure: bool,
    /// True when this result was served from the cache (including the case
    /// of following another caller's in-flight population).
    pub from_cache: bool,
}

impl SearchResults {
    fn from_entry(entry: &CacheEntry, from_cache: bool) -> Self {
        Self {
            fingerprint: entry.fingerprint.clone(),
            mentions: entry.mentions.clone(),
            platform_counts: entry.platform_counts.clone(),
            failed_platforms: entry.failed_platforms.clone(),
            partial_failure: entry.partial_failure,
            from_cache,
        }
    }
}

/// Coordinates the full search pipeline over a fixed set of connectors.
pub struct SearchOrchestrator {
    registry: ConnectorRegistry,
    cache: Arc<SearchCache>,
    limits: SearchLimits,
    snapshots: Option<Arc<dyn MentionSnapshotStore>>,
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new(registry: ConnectorRegistry, limits: SearchLimits) -> Self {
        let cache = Arc::new(SearchCache::new(limits.cache_ttl));
        Self {
            registry,
            cache,
            limits,
            snapshots: None,
        }
    }

    #[must_use]
    pub fn from_config(registry: ConnectorRegistry, config: &AppConfig) -> Self {
        Self::new(registry, SearchLimits::from_config(config))
    }

    /// Attach a snapshot store. Every freshly populated result set is
    /// pushed to it; store failures are logged and never fail the search.
    #[must_use]
    pub fn with_snapshot_store(mut self, store: Arc<dyn MentionSnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SearchCache> {
        &self.cache
    }

    /// Execute one search request.
    ///
    /// Identical requests (same fingerprint after normalization) within the
    /// cache TTL are served from the cache; concurrent identical requests
    /// share one fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for an empty or unservable
    /// request, [`SearchError::AllPlatformsFailed`] when no platform
    /// produced results, and [`SearchError::Fanout`] if the fan-out task
    /// itself died.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        let (query, fingerprint) = normalize(request)?;
        let connectors = self.resolve_connectors(&query)?;

        match self.cache.begin(&fingerprint) {
            Flight::Hit(entry) => {
                tracing::debug!(fingerprint = %fingerprint, "cache hit");
                Ok(SearchResults::from_entry(&entry, true))
            }
            Flight::Follower(receiver) => {
                tracing::debug!(fingerprint = %fingerprint, "joining in-flight search");
                let entry = await_flight(receiver).await?;
                Ok(SearchResults::from_entry(&entry, true))
            }
            Flight::Leader(guard) => self.lead(query, connectors, guard).await,
        }
    }

    fn resolve_connectors(
        &self,
        query: &CanonicalQuery,
    ) -> Result<Vec<Arc<dyn PlatformConnector>>, SearchError> {
        query
            .platforms
            .iter()
            .map(|platform| {
                self.registry
                    .get(*platform)
                    .ok_or_else(|| SearchError::InvalidQuery {
                        reason: format!("no connector registered for platform '{platform}'"),
                    })
            })
            .collect()
    }

    /// Run the population as the flight leader. The work is spawned so
    /// that a caller abandoning its future does not cancel a fan-out
    /// that followers are waiting on.
    async fn lead(
        &self,
        query: CanonicalQuery,
        connectors: Vec<Arc<dyn PlatformConnector>>,
        guard: FlightGuard,
    ) -> Result<SearchResults, SearchError> {
        let cache = Arc::clone(&self.cache);
        let limits = self.limits.clone();
        let snapshots = self.snapshots.clone();

        let handle = tokio::spawn(async move {
            populate(&cache, &limits, snapshots.as_deref(), query, connectors, guard).await
        });

        match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(SearchError::Fanout(join_error.to_string())),
        }
    }
}

/// Fan out, merge, filter, store, snapshot. Resolves the flight guard on
/// every path.
async fn populate(
    cache: &Arc<SearchCache>,
    limits: &SearchLimits,
    snapshots: Option<&dyn MentionSnapshotStore>,
    query: CanonicalQuery,
    connectors: Vec<Arc<dyn PlatformConnector>>,
    guard: FlightGuard,
) -> Result<SearchResults, SearchError> {
    let attempted = connectors.len();
    let outcomes = fan_out(limits, &query, connectors).await;

    let merged = match merge(outcomes) {
        Ok(merged) => merged,
        Err(error) => {
            guard.fail(attempted);
            return Err(error);
        }
    };

    let mentions = filter::apply(merged.mentions, &query.filters, Utc::now());
    let fingerprint = crate::normalize::fingerprint_of(&query);
    tracing::info!(
        fingerprint = %fingerprint,
        mentions = mentions.len(),
        failed_platforms = merged.failed_platforms.len(),
        "search populated"
    );

    let entry = cache.store_with_ttl(
        CacheEntry {
            fingerprint,
            mentions,
            platform_counts: merged.platform_counts,
            failed_platforms: merged.failed_platforms,
            partial_failure: merged.partial_failure,
            created_at: Utc::now(),
        },
        limits.cache_ttl,
    );

    if let Some(store) = snapshots {
        let snapshot = MentionSnapshot::from_entry(&query, &entry);
        if let Err(error) = store.save(&snapshot).await {
            tracing::warn!(
                snapshot_id = %snapshot.id,
                error = %error,
                "snapshot store failed; search result unaffected"
            );
        }
    }

    // Store before resolving the flight, so followers woken by the
    // completion always find the entry in place.
    let results = SearchResults::from_entry(&entry, false);
    guard.complete(entry);
    Ok(results)
}

/// Run every platform's connector with bounded concurrency and collect
/// outcomes keyed by platform. Connector failures become outcomes, never
/// errors: one slow or broken platform must not sink the fan-out.
async fn fan_out(
    limits: &SearchLimits,
    query: &CanonicalQuery,
    connectors: Vec<Arc<dyn PlatformConnector>>,
) -> BTreeMap<Platform, PlatformOutcome> {
    // Built as a Vec first: mapping the trait objects inside the stream
    // combinator runs into rustc's higher-ranked lifetime inference once
    // the future crosses a task spawn.
    let tasks: Vec<_> = connectors
        .into_iter()
        .map(|connector| {
            let keywords = query.keywords.clone();
            let filters = query.filters.clone();
            let limits = limits.clone();
            async move {
                let platform = connector.platform();
                let outcome = run_platform(&limits, connector, &keywords, &filters).await;
                (platform, outcome)
            }
        })
        .collect();
    stream::iter(tasks)
        .buffer_unordered(limits.max_concurrent_jobs.max(1))
        .collect::<BTreeMap<_, _>>()
        .await
}

/// One platform's search with per-attempt timeout and retry.
async fn run_platform(
    limits: &SearchLimits,
    connector: Arc<dyn PlatformConnector>,
    keywords: &[String],
    filters: &mentionscan_core::FilterSpec,
) -> PlatformOutcome {
    let platform = connector.platform();
    let attempt_timeout = limits.connector_timeout;

    let result = retry_with_backoff(limits.retry_attempts, limits.retry_backoff_base_ms, || {
        let connector = Arc::clone(&connector);
        async move {
            match timeout(attempt_timeout, connector.search(keywords, filters, attempt_timeout))
                .await
            {
                Ok(inner) => inner,
                Err(_) => Err(ConnectorError::Timeout {
                    platform,
                    timeout_secs: attempt_timeout.as_secs(),
                }),
            }
        }
    })
    .await;

    match result {
        Ok(mentions) => {
            tracing::debug!(
                platform = %platform,
                mentions = mentions.len(),
                "platform search succeeded"
            );
            PlatformOutcome::Success(mentions)
        }
        Err(error) => PlatformOutcome::Failure(error),
    }
}
