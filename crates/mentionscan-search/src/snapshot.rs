//! Snapshot export: freezing a cached result set for later persistence.
//!
//! The search core hands finished result sets across this boundary and
//! knows nothing about how they are stored. Implementations live with the
//! application (a JSON file store ships with the CLI).

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscan_core::{FilterSpec, Mention, Platform};
use serde::Serialize;
use uuid::Uuid;

use crate::cache::CacheEntry;
use crate::normalize::CanonicalQuery;

/// A self-contained, immutable copy of one search result set.
///
/// Snapshots duplicate the mentions rather than referencing cache state,
/// so they survive cache eviction and process restarts.
#[derive(Debug, Clone, Serialize)]
pub struct MentionSnapshot {
    pub id: Uuid,
    pub fingerprint: String,
    /// Canonical keywords the result set was produced from.
    pub keywords: Vec<String>,
    pub platforms: Vec<Platform>,
    pub filters: FilterSpec,
    pub mentions: Vec<Mention>,
    pub platform_counts: BTreeMap<Platform, usize>,
    pub partial_failure: bool,
    pub captured_at: DateTime<Utc>,
}

impl MentionSnapshot {
    /// Freeze a cache entry together with the canonical query that
    /// produced it.
    #[must_use]
    pub fn from_entry(query: &CanonicalQuery, entry: &CacheEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            fingerprint: entry.fingerprint.as_str().to_owned(),
            keywords: query.keywords.clone(),
            platforms: query.platforms.clone(),
            filters: query.filters.clone(),
            mentions: entry.mentions.clone(),
            platform_counts: entry.platform_counts.clone(),
            partial_failure: entry.partial_failure,
            captured_at: entry.created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot store rejected the snapshot: {0}")]
    Store(String),
    #[error("snapshot could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence boundary for snapshots. Failures here never fail the
/// search that produced the snapshot.
#[async_trait]
pub trait MentionSnapshotStore: Send + Sync {
    /// Persist one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the snapshot cannot be written.
    async fn save(&self, snapshot: &MentionSnapshot) -> Result<(), SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentionscan_core::SearchRequest;

    #[test]
    fn from_entry_copies_result_set_and_query_shape() {
        let request = SearchRequest::new(
            vec!["Rust".to_owned(), "rust".to_owned()],
            vec![Platform::Twitter, Platform::Reddit],
        );
        let (query, fingerprint) = crate::normalize::normalize(&request).unwrap();
        let entry = CacheEntry {
            fingerprint,
            mentions: vec![],
            platform_counts: BTreeMap::from([
                (Platform::Reddit, 4),
                (Platform::Twitter, 2),
            ]),
            failed_platforms: vec![],
            partial_failure: false,
            created_at: Utc::now(),
        };

        let snapshot = MentionSnapshot::from_entry(&query, &entry);

        assert_eq!(snapshot.keywords, vec!["rust"]);
        assert_eq!(snapshot.platforms, vec![Platform::Reddit, Platform::Twitter]);
        assert_eq!(snapshot.fingerprint, entry.fingerprint.as_str());
        assert_eq!(snapshot.platform_counts[&Platform::Reddit], 4);
        assert_eq!(snapshot.captured_at, entry.created_at);
    }

    #[test]
    fn serialization_failures_carry_their_source() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(matches!(
            SnapshotError::from(err),
            SnapshotError::Serialize(_)
        ));
    }

    #[test]
    fn snapshot_ids_are_unique() {
        let request = SearchRequest::new(vec!["x".to_owned()], vec![Platform::News]);
        let (query, fingerprint) = crate::normalize::normalize(&request).unwrap();
        let entry = CacheEntry {
            fingerprint,
            mentions: vec![],
            platform_counts: BTreeMap::new(),
            failed_platforms: vec![],
            partial_failure: false,
            created_at: Utc::now(),
        };

        let first = MentionSnapshot::from_entry(&query, &entry);
        let second = MentionSnapshot::from_entry(&query, &entry);
        assert_ne!(first.id, second.id);
    }
}
