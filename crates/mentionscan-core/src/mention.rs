//! Domain types for collected social-media mentions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// External platforms a search can be fanned out to.
///
/// This is a closed set: connector dispatch is keyed by `Platform`, never by
/// free-form strings. Variants are declared in lexicographic order of their
/// canonical identifier so the derived `Ord` matches identifier order — the
/// merge layer relies on this for deterministic output ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Hackernews,
    Instagram,
    Mastodon,
    News,
    Reddit,
    Twitter,
    Youtube,
}

impl Platform {
    /// All known platforms, in canonical identifier order.
    pub const ALL: [Platform; 8] = [
        Platform::Facebook,
        Platform::Hackernews,
        Platform::Instagram,
        Platform::Mastodon,
        Platform::News,
        Platform::Reddit,
        Platform::Twitter,
        Platform::Youtube,
    ];

    /// Canonical lowercase identifier used for dispatch, sorting, and display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Hackernews => "hackernews",
            Platform::Instagram => "instagram",
            Platform::Mastodon => "mastodon",
            Platform::News => "news",
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
            Platform::Youtube => "youtube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "hackernews" => Ok(Platform::Hackernews),
            "instagram" => Ok(Platform::Instagram),
            "mastodon" => Ok(Platform::Mastodon),
            "news" => Ok(Platform::News),
            "reddit" => Ok(Platform::Reddit),
            "twitter" | "x" => Ok(Platform::Twitter),
            "youtube" => Ok(Platform::Youtube),
            other => Err(CoreError::UnknownPlatform(other.to_owned())),
        }
    }
}

/// Classified tone of a mention, supplied by the source that produced it.
///
/// Mentionscan never computes sentiment itself; connectors pass through
/// whatever classification the upstream source provides (or `Neutral` when
/// the source has none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(CoreError::UnknownSentiment(other.to_owned())),
        }
    }
}

/// Broad content category of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Comment,
    Article,
    Video,
    Image,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Comment => "comment",
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Image => "image",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(ContentType::Post),
            "comment" => Ok(ContentType::Comment),
            "article" => Ok(ContentType::Article),
            "video" => Ok(ContentType::Video),
            "image" => Ok(ContentType::Image),
            other => Err(CoreError::UnknownContentType(other.to_owned())),
        }
    }
}

/// Interaction counts reported by the source platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

impl Engagement {
    /// Combined engagement used by the `[min, max]` filter bounds.
    #[must_use]
    pub fn total(self) -> u64 {
        self.likes
            .saturating_add(self.shares)
            .saturating_add(self.comments)
    }
}

/// One piece of content matching a search, as returned by a connector.
///
/// Immutable once produced: the cache and any snapshot export share mentions
/// by value (or behind `Arc`), and nothing in the pipeline mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Identifier assigned by the source platform.
    pub source_id: String,
    /// Platform this mention was collected from (provenance tag).
    pub platform: Platform,
    pub text: String,
    pub author: String,
    pub url: Option<String>,
    pub sentiment: Sentiment,
    pub engagement: Engagement,
    /// Estimated audience size; zero when the source does not report one.
    pub reach: u64,
    pub content_type: ContentType,
    /// ISO 3166-1 alpha-2 country code, when the source provides one.
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}
