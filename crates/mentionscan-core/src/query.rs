//! Search request and filter types.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::mention::{ContentType, Platform, Sentiment};
use crate::CoreError;

/// Relative time window a mention's creation time must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    LastDay,
    LastWeek,
    LastMonth,
    LastYear,
}

impl Period {
    /// Length of the window, ending at "now" as supplied to the filter
    /// pipeline.
    #[must_use]
    pub fn window(self) -> Duration {
        match self {
            Period::LastDay => Duration::days(1),
            Period::LastWeek => Duration::weeks(1),
            Period::LastMonth => Duration::days(30),
            Period::LastYear => Duration::days(365),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Period::LastDay => "last-day",
            Period::LastWeek => "last-week",
            Period::LastMonth => "last-month",
            Period::LastYear => "last-year",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-day" | "day" | "24h" => Ok(Period::LastDay),
            "last-week" | "week" => Ok(Period::LastWeek),
            "last-month" | "month" => Ok(Period::LastMonth),
            "last-year" | "year" => Ok(Period::LastYear),
            other => Err(CoreError::UnknownPeriod(other.to_owned())),
        }
    }
}

/// Optional constraints applied to merged results.
///
/// Every field defaults to `None`, which imposes no constraint. An unset
/// field and an explicitly defaulted one are indistinguishable, so both
/// canonicalize to the same query fingerprint.
///
/// `sentiment` is deliberately single-select: choosing a new sentiment
/// replaces the previous one rather than widening the allowed set. This
/// mirrors the product behavior the filter UI was built around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Two-letter language code (e.g. `en`). Participates in query
    /// identity only: the bundled connector APIs expose no language
    /// parameter, and mentions carry no language to post-filter on.
    pub language: Option<String>,
    /// Creation-time window ending at the moment the filter runs.
    pub period: Option<Period>,
    pub sentiment: Option<Sentiment>,
    /// Inclusive lower bound on [`crate::Engagement::total`].
    pub min_engagement: Option<u64>,
    /// Inclusive upper bound on [`crate::Engagement::total`].
    pub max_engagement: Option<u64>,
    pub content_type: Option<ContentType>,
    /// ISO 3166-1 alpha-2 country scope. Mentions without a country are
    /// excluded when this is set: an unknown origin cannot satisfy a
    /// geographic constraint.
    pub country: Option<String>,
    /// Free-text refinement: mention text must contain this term
    /// (case-insensitive).
    pub contains: Option<String>,
}

impl FilterSpec {
    /// True when no field constrains anything — the pass-through spec.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        *self == FilterSpec::default()
    }
}

/// A raw operator search request, before normalization.
///
/// Keyword and platform order is insignificant: the normalizer canonicalizes
/// both, so two requests differing only in ordering share a fingerprint and
/// therefore a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub filters: FilterSpec,
}

impl SearchRequest {
    #[must_use]
    pub fn new(keywords: Vec<String>, platforms: Vec<Platform>) -> Self {
        Self {
            keywords,
            platforms,
            filters: FilterSpec::default(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_spec_is_unconstrained() {
        assert!(FilterSpec::default().is_unconstrained());
    }

    #[test]
    fn filter_spec_with_sentiment_is_constrained() {
        let spec = FilterSpec {
            sentiment: Some(Sentiment::Negative),
            ..FilterSpec::default()
        };
        assert!(!spec.is_unconstrained());
    }

    #[test]
    fn period_parses_aliases() {
        assert_eq!("last-week".parse::<Period>().unwrap(), Period::LastWeek);
        assert_eq!("24h".parse::<Period>().unwrap(), Period::LastDay);
    }

    #[test]
    fn period_window_is_ordered() {
        assert!(Period::LastDay.window() < Period::LastWeek.window());
        assert!(Period::LastMonth.window() < Period::LastYear.window());
    }
}
