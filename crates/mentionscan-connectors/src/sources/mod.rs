//! Concrete connectors for the platforms mentionscan ships support for.
//!
//! Each connector talks to a public search endpoint over `reqwest`, takes a
//! base-URL override so tests can point it at a local mock server, and maps
//! HTTP-level failures to the typed [`ConnectorError`] taxonomy.

mod hackernews;
mod mastodon;
mod reddit;

pub use hackernews::HackerNewsConnector;
pub use mastodon::MastodonConnector;
pub use reddit::RedditConnector;

use mentionscan_core::Platform;
use reqwest::{Response, StatusCode};

use crate::error::ConnectorError;

/// Fallback `Retry-After` when a 429 response carries none or an
/// unparseable one.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Map a non-success HTTP status to its typed connector failure.
///
/// - 429 → [`ConnectorError::RateLimited`] with the `Retry-After` hint.
/// - 401/403 → [`ConnectorError::Unauthenticated`].
/// - any other non-2xx → [`ConnectorError::Unreachable`]; from the search
///   core's point of view a 500 and a refused connection degrade the
///   platform the same way.
pub(crate) fn ensure_success(
    platform: Platform,
    response: Response,
) -> Result<Response, ConnectorError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ConnectorError::RateLimited {
            platform,
            retry_after_secs: retry_after_secs(&response),
        });
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ConnectorError::Unauthenticated {
            platform,
            status: status.as_u16(),
        });
    }
    response
        .error_for_status()
        .map_err(|source| ConnectorError::Unreachable { platform, source })
}

/// Parse the `Retry-After` header as delay-seconds.
fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Normalise a configured base URL: exactly one trailing slash so joined
/// paths land under the root rather than replacing the last segment.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
