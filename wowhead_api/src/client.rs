//! HTTP client for the spell/item page renderer and the database CSV export.

use std::time::Duration;

use url::Url;

use crate::{user_agent::DEFAULT_USER_AGENT, Error, Resource};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// HTTP client that fetches a [`Resource`] as text.
///
/// Sends browser-like headers with a configurable user agent. No retries
/// happen here; a single failed request surfaces as an [`Error`] carrying the
/// status and any `Retry-After` hint so callers can decide how to back off.
pub struct Client {
    /// Base URL for rendered pages. Defaults to `https://www.wowhead.com`.
    pages_base_url: String,
    /// Base URL for the database export. Defaults to `https://wago.tools`.
    db_base_url: String,
    user_agent: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production sites.
    pub fn new(user_agent: &str) -> Result<Self, Error> {
        Self::with_base_urls("https://www.wowhead.com", "https://wago.tools", user_agent)
    }

    /// Creates a client with both sites served from one base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_base_urls(base_url, base_url, DEFAULT_USER_AGENT)
    }

    /// Creates a client with explicit base URLs for each site.
    pub fn with_base_urls(
        pages_base_url: &str,
        db_base_url: &str,
        user_agent: &str,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            pages_base_url: pages_base_url.trim_end_matches('/').to_string(),
            db_base_url: db_base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            http,
        })
    }

    /// The user agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Absolute URL for a resource.
    pub fn url_for(&self, resource: &Resource) -> Result<Url, Error> {
        let base = if resource.is_db_export() {
            &self.db_base_url
        } else {
            &self.pages_base_url
        };
        Url::parse(&format!("{}{}", base, resource.path())).map_err(|e| {
            tracing::error!("Invalid URL constructed for {}: {}", resource, e);
            Error::InvalidUrl(e.to_string())
        })
    }

    /// Fetches a resource body as text. Invalid UTF-8 is replaced, never rejected.
    pub async fn fetch_text(&self, resource: &Resource) -> Result<String, Error> {
        let url = self.url_for(resource)?;
        let resp = self
            .http
            .get(url)
            .header(
                "accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("accept-language", "en-US,en;q=0.9")
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Failed to get {}: {}", resource, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let bytes = resp.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read body of {}: {}", resource, e);
            Error::RequestFailed
        })?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                retry_after,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

/// Parses a `Retry-After` value given in (possibly fractional) seconds.
/// HTTP-date values are ignored.
fn parse_retry_after(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
