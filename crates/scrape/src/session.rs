// ABOUTME: The Scraper session: one fetched page plus the headers and cookies used to fetch it.
// ABOUTME: Exposes single-record extraction, repeated-record extraction and link collection.

use std::collections::{BTreeMap, BTreeSet};

use scraper::{ElementRef, Html};
use tracing::{info, warn};

use crate::error::{Result, ScrapeError};
use crate::extract::{extract, extract_document};
use crate::options::{FetchPolicy, Options, ScraperBuilder};
use crate::record::Record;
use crate::resource::agents::RandomUserAgent;
use crate::resource::{fetch_document, HttpFetcher};
use crate::selector::{Selector, SelectorSet};

/// Where and how to run repeated extraction.
#[derive(Debug, Clone)]
pub struct RepeatQuery {
    /// Section containing the items. Defaults to `<body>`.
    pub target: Selector,
    /// Repeated item inside the section. Defaults to `<div>`.
    pub items: Selector,
    pub suppress_errors: bool,
    /// Log item counts and per-item progress at info level.
    pub verbose: bool,
    /// Fail instead of returning an empty list when the section or items are missing.
    pub strict: bool,
}

impl Default for RepeatQuery {
    fn default() -> Self {
        Self {
            target: Selector::new("body"),
            items: Selector::new("div"),
            suppress_errors: false,
            verbose: false,
            strict: false,
        }
    }
}

impl RepeatQuery {
    pub fn new(target: Selector, items: Selector) -> Self {
        Self {
            target,
            items,
            ..Default::default()
        }
    }
}

/// A fetched page ready for extraction.
#[derive(Debug)]
pub struct Scraper {
    url: String,
    document: Option<Html>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl Scraper {
    /// Fetch `url` with default options.
    pub fn new(url: &str) -> Result<Self> {
        Self::builder().build(url)
    }

    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// Build a session from HTML already in hand. `url` is kept for reporting only.
    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Some(Html::parse_document(html)),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }

    pub(crate) fn with_options(url: &str, opts: Options) -> Result<Self> {
        let request = match opts.user_agents {
            Some(agents) => opts.fetch.request(url, agents.as_ref())?,
            None => opts.fetch.request(url, &RandomUserAgent)?,
        };

        let fetched = match opts.fetcher {
            Some(fetcher) => fetch_document(fetcher.as_ref(), &request),
            None => HttpFetcher::new().and_then(|f| fetch_document(&f, &request)),
        };

        let document = match (fetched, opts.fetch_policy) {
            (Ok(doc), _) => Some(doc),
            (Err(err), FetchPolicy::Raise) => return Err(err),
            (Err(err), FetchPolicy::Lenient) => {
                warn!(url = %request.url, error = %err, "fetch failed, continuing without a document");
                None
            }
        };

        Ok(Self {
            url: request.url,
            document,
            headers: request.headers,
            cookies: request.cookies,
        })
    }

    /// The fetched URL, after cleaning.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> Option<&Html> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Headers sent with the fetch.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Cookies sent with the fetch.
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    fn root(&self, op: &str) -> Result<ElementRef<'_>> {
        self.document
            .as_ref()
            .map(Html::root_element)
            .ok_or_else(|| ScrapeError::no_document(&self.url, op))
    }

    /// Extracts one record from the whole page.
    pub fn get_data(&self, fields: &SelectorSet, suppress_errors: bool) -> Result<Record<'_>> {
        let root = self.root("GetData")?;
        extract_document(root, fields, suppress_errors).map_err(|e| e.with_url(&self.url))
    }

    /// Extracts one record per item found under the target section.
    ///
    /// Items whose extraction fails are skipped. A missing section or an empty
    /// item list yields an empty list unless the query is strict.
    pub fn get_repeating_data(
        &self,
        query: &RepeatQuery,
        fields: &SelectorSet,
    ) -> Result<Vec<Record<'_>>> {
        let root = self.root("GetRepeatingData")?;

        let Some(section) = query.target.find_from(root) else {
            if query.strict {
                return Err(ScrapeError::section_not_found(&self.url, &query.target));
            }
            warn!(url = %self.url, target = %query.target, "target section not found");
            return Ok(Vec::new());
        };

        let items = query.items.find_all_in(section);
        if items.is_empty() {
            if query.strict {
                return Err(ScrapeError::no_items_found(&self.url, &query.items));
            }
            warn!(url = %self.url, items = %query.items, "no items found");
            return Ok(Vec::new());
        }

        if query.verbose {
            info!(url = %self.url, count = items.len(), "found items, extracting data");
        }

        let mut records = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            if query.verbose {
                info!(item = idx + 1, "extracting item");
            }
            match extract(item, fields, query.suppress_errors) {
                Ok(record) => records.push(record),
                Err(err) => warn!(url = %self.url, index = idx, error = %err, "skipping item"),
            }
        }
        Ok(records)
    }

    /// Collects distinct `href` values of anchors on the page, or under `target`.
    ///
    /// Empty hrefs and `#` are skipped. An unresolved target yields an empty set.
    pub fn links(&self, target: Option<&Selector>) -> Result<BTreeSet<String>> {
        let root = self.root("Links")?;
        let scope = match target {
            Some(sel) => match sel.find_from(root) {
                Some(section) => section,
                None => return Ok(BTreeSet::new()),
            },
            None => root,
        };

        Ok(Selector::new("a")
            .find_all_in(scope)
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && *href != "#")
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use crate::selector::OutputKind;
    use pretty_assertions::assert_eq;

    const LISTING: &str = r##"
        <html><body>
            <div class="header"><a href="/home">Home</a><a href="#">Top</a></div>
            <div class="results">
                <div class="item"><h2>A</h2><span class="price">1</span><a href="/a">a</a></div>
                <div class="item"><h2>B</h2><span class="price">2</span><a href="/a">a</a></div>
                <div class="item"><h2>C</h2><a href="">c</a></div>
                <div class="item"><h2>D</h2><span class="price">4</span></div>
                <div class="item"><h2>E</h2><span class="price">5</span></div>
            </div>
        </body></html>
    "##;

    fn fields() -> SelectorSet {
        SelectorSet::new()
            .with("title", Selector::new("h2"))
            .with("price", Selector::new("span").class("price"))
    }

    fn query() -> RepeatQuery {
        RepeatQuery::new(
            Selector::new("div").class("results"),
            Selector::new("div").class("item"),
        )
    }

    #[test]
    fn test_repeating_skips_failed_item() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let records = scraper.get_repeating_data(&query(), &fields()).unwrap();
        let titles: Vec<&str> = records.iter().filter_map(|r| r.text("title")).collect();
        assert_eq!(titles, vec!["A", "B", "D", "E"]);
    }

    #[test]
    fn test_repeating_suppressed_keeps_all_items() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let q = RepeatQuery {
            suppress_errors: true,
            ..query()
        };
        let records = scraper.get_repeating_data(&q, &fields()).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records[2].get("price").unwrap().is_missing());
    }

    #[test]
    fn test_repeating_missing_section() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let q = RepeatQuery::new(Selector::new("section"), Selector::new("div"));
        assert!(scraper.get_repeating_data(&q, &fields()).unwrap().is_empty());

        let strict = RepeatQuery { strict: true, ..q };
        let err = scraper.get_repeating_data(&strict, &fields()).unwrap_err();
        assert!(err.is_section_not_found());
    }

    #[test]
    fn test_repeating_no_items() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let q = RepeatQuery::new(Selector::new("div").class("results"), Selector::new("li"));
        assert!(scraper.get_repeating_data(&q, &fields()).unwrap().is_empty());

        let strict = RepeatQuery { strict: true, ..q };
        let err = scraper.get_repeating_data(&strict, &fields()).unwrap_err();
        assert!(err.is_no_items_found());
    }

    #[test]
    fn test_default_query_targets_body_divs() {
        let q = RepeatQuery::default();
        assert_eq!(q.target, Selector::new("body"));
        assert_eq!(q.items, Selector::new("div"));
        assert!(!q.suppress_errors && !q.verbose && !q.strict);
    }

    #[test]
    fn test_links_whole_page_and_section() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let all = scraper.links(None).unwrap();
        assert_eq!(all, BTreeSet::from(["/a".to_string(), "/home".to_string()]));

        let header = scraper.links(Some(&Selector::new("div").class("header"))).unwrap();
        assert_eq!(header, BTreeSet::from(["/home".to_string()]));

        let none = scraper.links(Some(&Selector::new("nav"))).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_get_data_error_carries_url() {
        let scraper = Scraper::from_html("https://shop.example", LISTING);
        let fields = SelectorSet::new().with("img", Selector::new("img").output(OutputKind::Src));
        let err = scraper.get_data(&fields, false).unwrap_err();
        assert!(err.is_extract());
        assert_eq!(err.url, "https://shop.example");
    }

    #[test]
    fn test_root_element_can_match() {
        let scraper = Scraper::from_html(
            "https://shop.example",
            r#"<html title="Catalogue"><body><div>one</div><div>two</div></body></html>"#,
        );
        let fields = SelectorSet::new()
            .with("title", Selector::new("html").output(OutputKind::Title))
            .with("page", Selector::new("html").output(OutputKind::Object));
        let record = scraper.get_data(&fields, false).unwrap();
        assert_eq!(record.text("title"), Some("Catalogue"));
        assert!(record.get("page").and_then(FieldValue::as_node).is_some());

        let q = RepeatQuery::new(Selector::new("html"), Selector::new("div"));
        let text = SelectorSet::new();
        assert_eq!(scraper.get_repeating_data(&q, &text).unwrap().len(), 2);
    }
}
