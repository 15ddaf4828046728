// ABOUTME: Page fetching: URL cleaning/validation, default headers and cookies, one blocking GET, HTML parsing.
// ABOUTME: The HTTP call sits behind the DocumentFetcher trait; HttpFetcher wraps reqwest's blocking client.

pub mod agents;

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::error::{Result, ScrapeError};
use agents::{RandomUserAgent, UserAgentSource};

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: u64 = 10 * 1024 * 1024;

/// Timeout applied to the single page request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cookie names sent, with empty values, when no cookies are configured.
pub const DEFAULT_COOKIE_NAMES: [&str; 3] = ["session-id", "session-id-time", "session-token"];

static URL_SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Per-fetch configuration. `None` headers or cookies fall back to the defaults.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub headers: Option<BTreeMap<String, String>>,
    pub cookies: Option<BTreeMap<String, String>>,
    pub timeout: Duration,
    /// Strip the query string before validating and fetching.
    pub clean: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            headers: None,
            cookies: None,
            timeout: DEFAULT_TIMEOUT,
            clean: false,
        }
    }
}

impl FetchConfig {
    /// Builds the request for `url`: cleans and validates it, then fills in default
    /// headers (a User-Agent from `agents`) and placeholder cookies.
    pub fn request(&self, url: &str, agents: &dyn UserAgentSource) -> Result<FetchRequest> {
        let url = prepare_url(url, self.clean)?;
        let headers = match &self.headers {
            Some(h) => h.clone(),
            None => BTreeMap::from([("User-Agent".to_string(), agents.next())]),
        };
        let cookies = match &self.cookies {
            Some(c) => c.clone(),
            None => default_cookies(),
        };
        Ok(FetchRequest {
            url,
            headers,
            cookies,
            timeout: self.timeout,
        })
    }
}

/// The placeholder cookie set used when none is configured.
pub fn default_cookies() -> BTreeMap<String, String> {
    DEFAULT_COOKIE_NAMES
        .iter()
        .map(|name| (name.to_string(), String::new()))
        .collect()
}

/// A fully resolved GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl FetchRequest {
    /// Value for the `Cookie` header, `None` when there are no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Raw response handed back by a [`DocumentFetcher`].
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResponse {
    /// Decode the body as UTF-8 text, using charset hints from the content-type header.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the HTTP GET for a page.
///
/// Implementations return the response for any status; status checks happen in
/// [`fetch_document`]. Transport failures are returned as errors.
pub trait DocumentFetcher: Send + Sync + std::fmt::Debug {
    fn get(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

/// [`DocumentFetcher`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| {
                ScrapeError::fetch("", "HttpFetcher", Some(anyhow::anyhow!("building client: {}", e)))
            })?;
        Ok(Self { client })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl DocumentFetcher for HttpFetcher {
    fn get(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let url = request.url.as_str();
        let mut builder = self.client.get(url).timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(cookie) = request.cookie_header() {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("request timed out: {}", e)))
            } else {
                ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
            }
        })?;

        // Check Content-Length header before reading body
        if let Some(len) = response.content_length() {
            if len > MAX_CONTENT_LENGTH {
                return Err(ScrapeError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = read_capped(response, MAX_CONTENT_LENGTH)
            .map_err(|e| {
                if is_timeout(&e) {
                    ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("reading body timed out: {}", e)))
                } else {
                    ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("failed to read body: {}", e)))
                }
            })?
            .ok_or_else(|| ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("content too large"))))?;

        Ok(FetchResponse {
            status,
            final_url,
            content_type,
            body: Bytes::from(body),
        })
    }
}

/// Reads at most `limit` bytes. Returns `None` when the stream holds more.
fn read_capped(reader: impl Read, limit: u64) -> io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    Ok((body.len() as u64 <= limit).then_some(body))
}

fn is_timeout(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}

/// Strips everything from the first `?` onward.
pub fn clean_url(url: &str) -> &str {
    match url.find('?') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Checks that `url` starts with `http://` or `https://` (any case).
pub fn validate_url(url: &str) -> Result<()> {
    if URL_SCHEME_RE.is_match(url) {
        Ok(())
    } else {
        Err(ScrapeError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ))
    }
}

/// Optionally cleans `url`, then validates it.
pub fn prepare_url(url: &str, clean: bool) -> Result<String> {
    let url = if clean { clean_url(url) } else { url };
    validate_url(url)?;
    Ok(url.to_string())
}

/// Sends `request` through `fetcher` once and parses the body into a document.
///
/// Non-2xx statuses and oversized bodies are fetch errors.
pub fn fetch_document(fetcher: &dyn DocumentFetcher, request: &FetchRequest) -> Result<Html> {
    debug!(url = %request.url, "fetching page");
    let response = fetcher.get(request)?;

    if !response.is_success() {
        return Err(ScrapeError::fetch(
            &request.url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", response.status)),
        ));
    }
    if response.body.len() as u64 > MAX_CONTENT_LENGTH {
        return Err(ScrapeError::fetch(
            &request.url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(
        url = %request.url,
        status = response.status,
        bytes = response.body.len(),
        "page fetched"
    );
    Ok(Html::parse_document(&response.text_utf8()))
}

/// Fetches and parses `url` with the default HTTP fetcher and random User-Agent.
pub fn fetch(url: &str, config: &FetchConfig) -> Result<Html> {
    let request = config.request(url, &RandomUserAgent)?;
    let fetcher = HttpFetcher::new()?;
    fetch_document(&fetcher, &request)
}

/// Shared handle types used by the scraper options.
pub type SharedFetcher = Arc<dyn DocumentFetcher>;
pub type SharedUserAgentSource = Arc<dyn UserAgentSource>;

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}
