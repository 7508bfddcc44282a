//! Reddit connector using the public listing search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscan_core::{
    ContentType, Engagement, FilterSpec, Mention, Period, Platform, Sentiment,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::connector::PlatformConnector;
use crate::error::ConnectorError;
use crate::sources::{ensure_success, normalize_base_url};

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
const PAGE_LIMIT: usize = 100;

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: Option<String>,
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    permalink: Option<String>,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: f64,
}

/// Connector for Reddit's public `/search.json` listing API.
///
/// Use [`RedditConnector::new`] for production or
/// [`RedditConnector::with_base_url`] to point at a mock server in tests.
pub struct RedditConnector {
    client: reqwest::Client,
    base_url: String,
}

impl RedditConnector {
    /// Creates a connector pointed at reddit.com.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Unreachable`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, ConnectorError> {
        Self::with_base_url(user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a connector with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Unreachable`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|source| ConnectorError::Unreachable {
                platform: Platform::Reddit,
                source,
            })?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    fn search_url(&self, keywords: &[String], filters: &FilterSpec) -> String {
        let query = keywords.join(" OR ");
        let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC).to_string();
        let mut url = format!(
            "{}search.json?q={encoded}&limit={PAGE_LIMIT}&sort=new",
            self.base_url
        );
        // Push the period down as Reddit's `t` window; the filter pipeline
        // re-checks timestamps afterwards.
        if let Some(period) = filters.period {
            let t = match period {
                Period::LastDay => "day",
                Period::LastWeek => "week",
                Period::LastMonth => "month",
                Period::LastYear => "year",
            };
            url.push_str("&t=");
            url.push_str(t);
        }
        url
    }
}

#[async_trait]
impl PlatformConnector for RedditConnector {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn search(
        &self,
        keywords: &[String],
        filters: &FilterSpec,
        timeout: Duration,
    ) -> Result<Vec<Mention>, ConnectorError> {
        let url = self.search_url(keywords, filters);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                ConnectorError::from_transport(Platform::Reddit, timeout.as_secs(), e)
            })?;
        let response = ensure_success(Platform::Reddit, response)?;

        let listing: Listing =
            response
                .json()
                .await
                .map_err(|e| ConnectorError::MalformedResponse {
                    platform: Platform::Reddit,
                    reason: e.to_string(),
                })?;

        let mentions: Vec<Mention> = listing
            .data
            .children
            .into_iter()
            .filter_map(|post| to_mention(post.data))
            .collect();

        tracing::debug!(
            platform = %Platform::Reddit,
            count = mentions.len(),
            "collected reddit mentions"
        );
        Ok(mentions)
    }
}

fn to_mention(data: PostData) -> Option<Mention> {
    let source_id = data.id?;
    let title = data.title.unwrap_or_default();
    let selftext = data.selftext.unwrap_or_default();
    let text = if selftext.trim().is_empty() {
        title.clone()
    } else {
        format!("{title}\n{selftext}")
    };
    if text.trim().is_empty() {
        return None;
    }

    #[allow(clippy::cast_sign_loss)]
    let likes = data.ups.max(0) as u64;
    #[allow(clippy::cast_possible_truncation)]
    let created_at = DateTime::<Utc>::from_timestamp(data.created_utc as i64, 0)?;

    Some(Mention {
        source_id,
        platform: Platform::Reddit,
        text,
        author: data.author.unwrap_or_else(|| "[deleted]".to_owned()),
        url: data
            .permalink
            .map(|p| format!("https://www.reddit.com{p}")),
        // Reddit does not classify sentiment; the pipeline treats it as
        // an opaque input field.
        sentiment: Sentiment::Neutral,
        engagement: Engagement {
            likes,
            shares: 0,
            comments: data.num_comments,
        },
        reach: 0,
        content_type: ContentType::Post,
        country: None,
        created_at,
    })
}
