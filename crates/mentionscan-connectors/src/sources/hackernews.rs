//! Hacker News connector via the Algolia search API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscan_core::{ContentType, Engagement, FilterSpec, Mention, Platform, Sentiment};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::connector::PlatformConnector;
use crate::error::ConnectorError;
use crate::sources::{ensure_success, normalize_base_url};

const DEFAULT_BASE_URL: &str = "https://hn.algolia.com";
const PAGE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    story_text: Option<String>,
    comment_text: Option<String>,
    author: Option<String>,
    url: Option<String>,
    #[serde(default)]
    points: Option<i64>,
    #[serde(default)]
    num_comments: Option<u64>,
    created_at_i: i64,
}

/// Connector for the Algolia-hosted Hacker News search API.
pub struct HackerNewsConnector {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsConnector {
    /// Creates a connector pointed at hn.algolia.com.
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
                platform: Platform::Hackernews,
                source,
            })?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    fn search_url(&self, keywords: &[String], filters: &FilterSpec, now: DateTime<Utc>) -> String {
        let query = keywords.join(" ");
        let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC).to_string();
        let mut url = format!(
            "{}api/v1/search_by_date?query={encoded}&tags=(story,comment)&hitsPerPage={PAGE_LIMIT}",
            self.base_url
        );
        // Algolia supports numeric creation-time filters; push the period
        // down so old items never cross the wire.
        if let Some(period) = filters.period {
            let cutoff = (now - period.window()).timestamp();
            url.push_str(&format!("&numericFilters=created_at_i>{cutoff}"));
        }
        url
    }
}

#[async_trait]
impl PlatformConnector for HackerNewsConnector {
    fn platform(&self) -> Platform {
        Platform::Hackernews
    }

    async fn search(
        &self,
        keywords: &[String],
        filters: &FilterSpec,
        timeout: Duration,
    ) -> Result<Vec<Mention>, ConnectorError> {
        let url = self.search_url(keywords, filters, Utc::now());
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                ConnectorError::from_transport(Platform::Hackernews, timeout.as_secs(), e)
            })?;
        let response = ensure_success(Platform::Hackernews, response)?;

        let payload: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ConnectorError::MalformedResponse {
                    platform: Platform::Hackernews,
                    reason: e.to_string(),
                })?;

        let mentions: Vec<Mention> = payload.hits.into_iter().filter_map(to_mention).collect();

        tracing::debug!(
            platform = %Platform::Hackernews,
            count = mentions.len(),
            "collected hacker news mentions"
        );
        Ok(mentions)
    }
}

fn to_mention(hit: Hit) -> Option<Mention> {
    let (text, content_type) = match (&hit.title, &hit.comment_text) {
        (Some(title), _) if !title.trim().is_empty() => {
            let body = hit.story_text.as_deref().unwrap_or_default();
            let text = if body.trim().is_empty() {
                title.clone()
            } else {
                format!("{title}\n{body}")
            };
            (text, ContentType::Post)
        }
        (_, Some(comment)) if !comment.trim().is_empty() => {
            (comment.clone(), ContentType::Comment)
        }
        _ => return None,
    };

    #[allow(clippy::cast_sign_loss)]
    let likes = hit.points.unwrap_or(0).max(0) as u64;
    let created_at = DateTime::<Utc>::from_timestamp(hit.created_at_i, 0)?;

    Some(Mention {
        source_id: hit.object_id,
        platform: Platform::Hackernews,
        text,
        author: hit.author.unwrap_or_else(|| "unknown".to_owned()),
        url: hit.url,
        sentiment: Sentiment::Neutral,
        engagement: Engagement {
            likes,
            shares: 0,
            comments: hit.num_comments.unwrap_or(0),
        },
        reach: 0,
        content_type,
        country: None,
        created_at,
    })
}
