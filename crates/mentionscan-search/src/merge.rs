//! Merging per-platform outcomes into one result set.

use std::collections::BTreeMap;

use mentionscan_connectors::ConnectorError;
use mentionscan_core::{Mention, Platform};

use crate::error::SearchError;

/// Result of one platform's search within a single fan-out pass.
/// Never persisted; consumed entirely by [`merge`].
#[derive(Debug)]
pub enum PlatformOutcome {
    Success(Vec<Mention>),
    Failure(ConnectorError),
}

/// The combined result set of one fan-out.
#[derive(Debug, Clone)]
pub struct MergedSet {
    /// All successful platforms' mentions, in canonical platform order,
    /// source order preserved within each platform. No relevance re-sort
    /// happens at this layer.
    pub mentions: Vec<Mention>,
    /// Pre-filter mention count per successful platform.
    pub platform_counts: BTreeMap<Platform, usize>,
    /// Platforms whose outcome was a failure, canonical order.
    pub failed_platforms: Vec<Platform>,
    /// True iff at least one platform failed and at least one succeeded.
    pub partial_failure: bool,
}

/// Merge per-platform outcomes.
///
/// The `BTreeMap` key order is the normalized platform order, which makes
/// the merged sequence deterministic regardless of task completion order.
///
/// # Errors
///
/// Returns [`SearchError::AllPlatformsFailed`] when every outcome is a
/// failure — the one condition this layer escalates instead of absorbing.
pub fn merge(outcomes: BTreeMap<Platform, PlatformOutcome>) -> Result<MergedSet, SearchError> {
    let attempted = outcomes.len();
    let mut mentions = Vec::new();
    let mut platform_counts = BTreeMap::new();
    let mut failed_platforms = Vec::new();

    for (platform, outcome) in outcomes {
        match outcome {
            PlatformOutcome::Success(platform_mentions) => {
                platform_counts.insert(platform, platform_mentions.len());
                mentions.extend(platform_mentions);
            }
            PlatformOutcome::Failure(error) => {
                tracing::warn!(
                    platform = %platform,
                    error = %error,
                    "platform excluded from merged results"
                );
                failed_platforms.push(platform);
            }
        }
    }

    if platform_counts.is_empty() {
        return Err(SearchError::AllPlatformsFailed { attempted });
    }

    let partial_failure = !failed_platforms.is_empty();
    Ok(MergedSet {
        mentions,
        platform_counts,
        failed_platforms,
        partial_failure,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mentionscan_core::{ContentType, Engagement, Sentiment};

    use super::*;

    fn mention(platform: Platform, id: &str) -> Mention {
        Mention {
            source_id: id.to_owned(),
            platform,
            text: format!("mention {id}"),
            author: "someone".to_owned(),
            url: None,
            sentiment: Sentiment::Neutral,
            engagement: Engagement::default(),
            reach: 0,
            content_type: ContentType::Post,
            country: None,
            created_at: Utc::now(),
        }
    }

    fn timeout(platform: Platform) -> ConnectorError {
        ConnectorError::Timeout {
            platform,
            timeout_secs: 5,
        }
    }

    #[test]
    fn merges_in_canonical_platform_order() {
        let mut outcomes = BTreeMap::new();
        // Insertion order deliberately scrambled; BTreeMap restores it.
        outcomes.insert(
            Platform::Twitter,
            PlatformOutcome::Success(vec![mention(Platform::Twitter, "t1")]),
        );
        outcomes.insert(
            Platform::Facebook,
            PlatformOutcome::Success(vec![
                mention(Platform::Facebook, "f1"),
                mention(Platform::Facebook, "f2"),
            ]),
        );

        let merged = merge(outcomes).unwrap();
        let ids: Vec<&str> = merged.mentions.iter().map(|m| m.source_id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2", "t1"], "facebook sorts before twitter");
        assert_eq!(merged.platform_counts[&Platform::Facebook], 2);
        assert_eq!(merged.platform_counts[&Platform::Twitter], 1);
        assert!(!merged.partial_failure);
        assert!(merged.failed_platforms.is_empty());
    }

    #[test]
    fn partial_failure_keeps_successful_subset() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            Platform::Reddit,
            PlatformOutcome::Success(vec![mention(Platform::Reddit, "r1")]),
        );
        outcomes.insert(
            Platform::Mastodon,
            PlatformOutcome::Failure(timeout(Platform::Mastodon)),
        );

        let merged = merge(outcomes).unwrap();
        assert_eq!(merged.mentions.len(), 1);
        assert!(merged.partial_failure);
        assert_eq!(merged.failed_platforms, vec![Platform::Mastodon]);
        assert!(!merged.platform_counts.contains_key(&Platform::Mastodon));
    }

    #[test]
    fn all_failures_escalate() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            Platform::Reddit,
            PlatformOutcome::Failure(timeout(Platform::Reddit)),
        );
        outcomes.insert(
            Platform::Twitter,
            PlatformOutcome::Failure(timeout(Platform::Twitter)),
        );

        let result = merge(outcomes);
        assert!(matches!(
            result,
            Err(SearchError::AllPlatformsFailed { attempted: 2 })
        ));
    }

    #[test]
    fn successful_platform_with_zero_mentions_is_not_a_failure() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(Platform::Reddit, PlatformOutcome::Success(vec![]));

        let merged = merge(outcomes).unwrap();
        assert!(merged.mentions.is_empty());
        assert_eq!(merged.platform_counts[&Platform::Reddit], 0);
        assert!(!merged.partial_failure);
    }
}
