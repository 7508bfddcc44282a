//! Mastodon connector using the `/api/v2/search` endpoint of one instance.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscan_core::{ContentType, Engagement, FilterSpec, Mention, Platform, Sentiment};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::connector::PlatformConnector;
use crate::error::ConnectorError;
use crate::sources::{ensure_success, normalize_base_url};

const DEFAULT_BASE_URL: &str = "https://mastodon.social";
const PAGE_LIMIT: usize = 40;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    content: String,
    url: Option<String>,
    created_at: DateTime<Utc>,
    account: Account,
    #[serde(default)]
    favourites_count: u64,
    #[serde(default)]
    reblogs_count: u64,
    #[serde(default)]
    replies_count: u64,
}

#[derive(Debug, Deserialize)]
struct Account {
    acct: String,
    #[serde(default)]
    followers_count: u64,
}

/// Connector for one Mastodon instance's full-text search.
///
/// Instance-level search commonly requires a bearer token; without one many
/// instances answer 401/403, which surfaces as
/// [`ConnectorError::Unauthenticated`].
pub struct MastodonConnector {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MastodonConnector {
    /// Creates a connector pointed at mastodon.social.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Unreachable`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(user_agent: &str, access_token: Option<String>) -> Result<Self, ConnectorError> {
        Self::with_base_url(user_agent, access_token, DEFAULT_BASE_URL)
    }

    /// Creates a connector with a custom base URL (for testing with wiremock,
    /// or to target another instance).
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Unreachable`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        user_agent: &str,
        access_token: Option<String>,
        base_url: &str,
    ) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|source| ConnectorError::Unreachable {
                platform: Platform::Mastodon,
                source,
            })?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            access_token,
        })
    }

    fn search_url(&self, keywords: &[String]) -> String {
        let query = keywords.join(" ");
        let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC).to_string();
        format!(
            "{}api/v2/search?q={encoded}&type=statuses&limit={PAGE_LIMIT}",
            self.base_url
        )
    }
}

#[async_trait]
impl PlatformConnector for MastodonConnector {
    fn platform(&self) -> Platform {
        Platform::Mastodon
    }

    async fn search(
        &self,
        keywords: &[String],
        _filters: &FilterSpec,
        timeout: Duration,
    ) -> Result<Vec<Mention>, ConnectorError> {
        let url = self.search_url(keywords);
        let mut request = self.client.get(&url).timeout(timeout);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| {
            ConnectorError::from_transport(Platform::Mastodon, timeout.as_secs(), e)
        })?;
        let response = ensure_success(Platform::Mastodon, response)?;

        let payload: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ConnectorError::MalformedResponse {
                    platform: Platform::Mastodon,
                    reason: e.to_string(),
                })?;

        let mentions: Vec<Mention> = payload
            .statuses
            .into_iter()
            .filter_map(to_mention)
            .collect();

        tracing::debug!(
            platform = %Platform::Mastodon,
            count = mentions.len(),
            "collected mastodon mentions"
        );
        Ok(mentions)
    }
}

fn to_mention(status: Status) -> Option<Mention> {
    let text = strip_html(&status.content);
    if text.trim().is_empty() {
        return None;
    }
    Some(Mention {
        source_id: status.id,
        platform: Platform::Mastodon,
        text,
        author: status.account.acct,
        url: status.url,
        sentiment: Sentiment::Neutral,
        engagement: Engagement {
            likes: status.favourites_count,
            shares: status.reblogs_count,
            comments: status.replies_count,
        },
        reach: status.account.followers_count,
        content_type: ContentType::Post,
        // Statuses carry a language, not an origin country.
        country: None,
        created_at: status.created_at,
    })
}

/// Drop HTML tags from status content. Statuses arrive as sanitized HTML
/// fragments; a tag scan is enough, no entity handling beyond the common
/// ones.
fn strip_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_owned()
}
