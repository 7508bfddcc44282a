//! Query normalization and fingerprinting.
//!
//! An operator request is canonicalized — keywords trimmed, lowercased,
//! deduplicated and sorted; platforms deduplicated and sorted; filters
//! reduced to their sentinel form — and hashed into a [`Fingerprint`], the
//! cache identity of the search. Two requests that differ only in ordering,
//! casing, or surplus whitespace share a fingerprint and therefore a cache
//! entry and a single-flight slot.

use std::collections::BTreeSet;

use mentionscan_core::{FilterSpec, Platform, SearchRequest};
use sha2::{Digest, Sha256};

use crate::error::SearchError;

/// Deterministic identity of a normalized query, used as the cache key.
///
/// Lowercase-hex SHA-256 of the canonical encoding. Computing it is pure:
/// identical input always yields the identical fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request after normalization: sorted, deduplicated, canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery {
    /// Sorted lexicographically, lowercased, whitespace-collapsed, deduped.
    pub keywords: Vec<String>,
    /// Sorted by canonical identifier, deduped.
    pub platforms: Vec<Platform>,
    pub filters: FilterSpec,
}

/// Canonicalize a raw request and compute its fingerprint.
///
/// # Errors
///
/// Returns [`SearchError::InvalidQuery`] when no keywords survive
/// normalization or no platforms were requested.
pub fn normalize(request: &SearchRequest) -> Result<(CanonicalQuery, Fingerprint), SearchError> {
    let keywords: BTreeSet<String> = request
        .keywords
        .iter()
        .map(|k| canonical_keyword(k))
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(SearchError::InvalidQuery {
            reason: "no keywords left after normalization".to_owned(),
        });
    }

    if request.platforms.is_empty() {
        return Err(SearchError::InvalidQuery {
            reason: "no platforms requested".to_owned(),
        });
    }
    let mut platforms: Vec<Platform> = request
        .platforms
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    platforms.sort_unstable_by_key(|p| p.as_str());

    let canonical = CanonicalQuery {
        keywords: keywords.into_iter().collect(),
        platforms,
        filters: canonical_filters(&request.filters),
    };
    let fingerprint = fingerprint_of(&canonical);
    Ok((canonical, fingerprint))
}

/// Lowercase, trim, and collapse internal whitespace runs to single spaces.
/// The collapse also guarantees the canonical encoding's newline separators
/// can never occur inside a keyword.
fn canonical_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Reduce a filter spec to its sentinel form: string fields trimmed and
/// lowercased, empty strings treated as unset. An unset field and an
/// explicitly defaulted one end up identical.
fn canonical_filters(filters: &FilterSpec) -> FilterSpec {
    let canonical_string = |value: &Option<String>| -> Option<String> {
        value
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    };
    FilterSpec {
        language: canonical_string(&filters.language),
        period: filters.period,
        sentiment: filters.sentiment,
        min_engagement: filters.min_engagement,
        max_engagement: filters.max_engagement,
        content_type: filters.content_type,
        country: canonical_string(&filters.country),
        contains: canonical_string(&filters.contains),
    }
}

pub(crate) fn fingerprint_of(query: &CanonicalQuery) -> Fingerprint {
    Fingerprint(format!("{:x}", Sha256::digest(canonical_encoding(query))))
}

/// Stable textual encoding of a canonical query. Unset filter fields encode
/// as the `-` sentinel so "not specified" and "explicitly default" hash
/// identically.
fn canonical_encoding(query: &CanonicalQuery) -> String {
    fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_owned(), |v| v.to_string())
    }

    let platforms: Vec<&str> = query.platforms.iter().map(|p| p.as_str()).collect();
    let f = &query.filters;
    format!(
        "kw:{}\npf:{}\nlang:{}\nperiod:{}\nsent:{}\neng:{}..{}\nctype:{}\ngeo:{}\ntext:{}",
        query.keywords.join("\n"),
        platforms.join(","),
        opt(f.language.as_deref()),
        opt(f.period),
        opt(f.sentiment),
        opt(f.min_engagement),
        opt(f.max_engagement),
        opt(f.content_type),
        opt(f.country.as_deref()),
        opt(f.contains.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use mentionscan_core::{Period, Sentiment};

    use super::*;

    fn request(keywords: &[&str], platforms: &[Platform]) -> SearchRequest {
        SearchRequest::new(
            keywords.iter().map(|k| (*k).to_owned()).collect(),
            platforms.to_vec(),
        )
    }

    #[test]
    fn keyword_order_does_not_change_fingerprint() {
        let (_, a) = normalize(&request(
            &["covid", "vaccine"],
            &[Platform::Twitter, Platform::Facebook],
        ))
        .unwrap();
        let (_, b) = normalize(&request(
            &["vaccine", "covid"],
            &[Platform::Twitter, Platform::Facebook],
        ))
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn platform_order_does_not_change_fingerprint() {
        let (_, a) = normalize(&request(
            &["covid"],
            &[Platform::Twitter, Platform::Facebook],
        ))
        .unwrap();
        let (_, b) = normalize(&request(
            &["covid"],
            &[Platform::Facebook, Platform::Twitter],
        ))
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn casing_whitespace_and_duplicates_are_canonicalized() {
        let (canonical, a) = normalize(&request(
            &["  Covid ", "covid", "LONG\t covid"],
            &[Platform::Reddit, Platform::Reddit],
        ))
        .unwrap();
        assert_eq!(canonical.keywords, vec!["covid", "long covid"]);
        assert_eq!(canonical.platforms, vec![Platform::Reddit]);

        let (_, b) = normalize(&request(&["long covid", "covid"], &[Platform::Reddit])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unset_and_explicit_default_filters_share_a_fingerprint() {
        let base = request(&["covid"], &[Platform::Reddit]);
        let explicit = base.clone().with_filters(FilterSpec {
            language: Some(String::new()),
            country: Some("  ".to_owned()),
            ..FilterSpec::default()
        });
        let (_, a) = normalize(&base).unwrap();
        let (_, b) = normalize(&explicit).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_filters_produce_different_fingerprints() {
        let base = request(&["covid"], &[Platform::Reddit]);
        let filtered = base.clone().with_filters(FilterSpec {
            sentiment: Some(Sentiment::Negative),
            ..FilterSpec::default()
        });
        let windowed = base.clone().with_filters(FilterSpec {
            period: Some(Period::LastWeek),
            ..FilterSpec::default()
        });
        let (_, a) = normalize(&base).unwrap();
        let (_, b) = normalize(&filtered).unwrap();
        let (_, c) = normalize(&windowed).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn empty_keywords_after_normalization_is_invalid() {
        let result = normalize(&request(&["  ", "\t"], &[Platform::Reddit]));
        assert!(matches!(result, Err(SearchError::InvalidQuery { .. })));
    }

    #[test]
    fn empty_platforms_is_invalid() {
        let result = normalize(&request(&["covid"], &[]));
        assert!(matches!(result, Err(SearchError::InvalidQuery { .. })));
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        let req = request(&["covid"], &[Platform::Reddit]);
        let (_, a) = normalize(&req).unwrap();
        let (_, b) = normalize(&req).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64, "hex-encoded sha-256");
    }
}
