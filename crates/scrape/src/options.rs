// ABOUTME: Configuration options for the scraper including FetchPolicy, Options, and ScraperBuilder.
// ABOUTME: ScraperBuilder provides a fluent API for fetching a page into a Scraper session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::resource::agents::UserAgentSource;
use crate::resource::{DocumentFetcher, FetchConfig, SharedFetcher, SharedUserAgentSource};
use crate::session::Scraper;

/// What to do when the page fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Return the fetch error from the constructor.
    #[default]
    Raise,
    /// Log the error and build a session without a document.
    Lenient,
}

/// Configuration for a scraper session.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub fetch: FetchConfig,
    pub fetch_policy: FetchPolicy,
    pub fetcher: Option<SharedFetcher>,
    pub user_agents: Option<SharedUserAgentSource>,
}

/// Builder for constructing Scraper sessions with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ScraperBuilder {
    opts: Options,
}

impl ScraperBuilder {
    /// Create a new ScraperBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.fetch.timeout = timeout;
        self
    }

    /// Set the User-Agent header. Any explicit header disables the random default.
    pub fn user_agent(self, user_agent: impl Into<String>) -> Self {
        self.header("User-Agent", user_agent)
    }

    /// Add a request header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts
            .fetch
            .headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the request headers.
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.opts.fetch.headers = Some(headers);
        self
    }

    /// Add a cookie. Any explicit cookie disables the placeholder defaults.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts
            .fetch
            .cookies
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the cookies.
    pub fn cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.opts.fetch.cookies = Some(cookies);
        self
    }

    /// Strip the query string from the URL before fetching.
    pub fn clean(mut self, clean: bool) -> Self {
        self.opts.fetch.clean = clean;
        self
    }

    /// Choose how fetch failures are handled.
    pub fn fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.opts.fetch_policy = policy;
        self
    }

    /// Use a custom document fetcher.
    pub fn fetcher(mut self, fetcher: impl DocumentFetcher + 'static) -> Self {
        self.opts.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Use a custom User-Agent source for default headers.
    pub fn user_agent_source(mut self, source: impl UserAgentSource + 'static) -> Self {
        self.opts.user_agents = Some(Arc::new(source));
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Fetch `url` and build the session.
    pub fn build(self, url: &str) -> Result<Scraper> {
        Scraper::with_options(url, self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_cookie_accumulate() {
        let builder = ScraperBuilder::new()
            .user_agent("ua")
            .header("Accept", "text/html")
            .cookie("sid", "1")
            .clean(true)
            .timeout(Duration::from_secs(5));
        let fetch = &builder.options().fetch;
        let headers = fetch.headers.as_ref().unwrap();
        assert_eq!(headers.get("User-Agent").map(String::as_str), Some("ua"));
        assert_eq!(headers.len(), 2);
        assert_eq!(fetch.cookies.as_ref().unwrap().len(), 1);
        assert!(fetch.clean);
        assert_eq!(fetch.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults() {
        let builder = ScraperBuilder::new();
        assert!(builder.options().fetch.headers.is_none());
        assert!(builder.options().fetch.cookies.is_none());
        assert_eq!(builder.options().fetch_policy, FetchPolicy::Raise);
    }
}
