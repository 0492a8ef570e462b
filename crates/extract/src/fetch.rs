//! External stylesheet resolution and retrieval.
//!
//! The extractor never talks to the network directly; it goes through a
//! [`StylesheetFetcher`]. [`HttpFetcher`] is the production implementation,
//! [`NoopFetcher`] is used when fetching is disabled, and tests plug in
//! in-memory fetchers.

use reqwest::header::REFERER;
use thiserror::Error;
use url::Url;

use crate::config::ExtractConfig;
use crate::error::ExtractError;

/// Failure to retrieve a single stylesheet. Always recoverable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
    #[error("stylesheet fetching is disabled")]
    Disabled,
}

/// Source of external stylesheet text.
pub trait StylesheetFetcher: Send + Sync {
    /// Fetch the stylesheet at `url`. `referer` is the page's base URL when
    /// it declares one, otherwise the stylesheet URL itself.
    fn fetch(&self, url: &Url, referer: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher using the timeout and user agent from `cfg`.
    pub fn new(cfg: &ExtractConfig) -> Result<Self, ExtractError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.fetch_timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|err| ExtractError::HttpClient(err.to_string()))?;
        Ok(Self { client })
    }
}

impl StylesheetFetcher for HttpFetcher {
    fn fetch(&self, url: &Url, referer: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(REFERER, referer)
            .send()
            .map_err(|err| FetchError::Request {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|err| FetchError::Request {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(body)
    }
}

/// Fetcher that never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFetcher;

impl StylesheetFetcher for NoopFetcher {
    fn fetch(&self, _url: &Url, _referer: &str) -> Result<String, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Resolve a stylesheet `href` to an absolute http(s) URL.
///
/// - `//host/x.css` is upgraded to `https://host/x.css`.
/// - `/x.css` is joined onto `base` when the page declares one.
/// - Anything that is not an absolute `http`/`https` URL afterwards yields
///   `None`, including document-relative paths such as `css/x.css`.
pub fn resolve_stylesheet_url(href: &str, base: Option<&str>) -> Option<Url> {
    if href.is_empty() {
        return None;
    }

    let candidate = if let Some(rest) = href.strip_prefix("//") {
        Url::parse(&format!("https://{rest}")).ok()?
    } else if href.starts_with('/') {
        Url::parse(base?).ok()?.join(href).ok()?
    } else {
        Url::parse(href).ok()?
    };

    match candidate.scheme() {
        "http" | "https" => Some(candidate),
        _ => None,
    }
}
