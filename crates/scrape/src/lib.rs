// ABOUTME: Library entry point for the dputils page scraper.
// ABOUTME: Re-exports the public API: Scraper, ScraperBuilder, Selector, SelectorSet, Record, ScrapeError.

//! Declarative HTML scraping.
//!
//! Fetch a page once, then pull named fields out of it with [`Selector`]s:
//! either a single record for the whole page or one record per repeated item.
//!
//! # Example
//!
//! ```no_run
//! use dputils_scrape::{OutputKind, RepeatQuery, ScrapeError, Scraper, Selector, SelectorSet};
//!
//! fn main() -> Result<(), ScrapeError> {
//!     let scraper = Scraper::builder().clean(true).build("https://example.com/search?q=phones")?;
//!     let fields = SelectorSet::new()
//!         .with("title", Selector::new("div").class("title"))
//!         .with("link", Selector::new("a").class("product").output(OutputKind::Href));
//!     let query = RepeatQuery::new(
//!         Selector::new("div").class("results"),
//!         Selector::new("div").class("result"),
//!     );
//!     for record in scraper.get_repeating_data(&query, &fields)? {
//!         println!("{}", serde_json::to_string(&record).unwrap());
//!     }
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod extract;
pub mod options;
pub mod record;
pub mod resource;
pub mod selector;
pub mod session;

pub use crate::error::{ErrorCode, Result, ScrapeError};
pub use crate::extract::{extract, extract_document};
pub use crate::options::{FetchPolicy, Options, ScraperBuilder};
pub use crate::record::{FieldValue, Record};
pub use crate::resource::agents::{FixedUserAgent, RandomUserAgent, UserAgentSource};
pub use crate::resource::{
    fetch, DocumentFetcher, FetchConfig, FetchRequest, FetchResponse, HttpFetcher,
};
pub use crate::selector::{OutputKind, Selector, SelectorSet};
pub use crate::session::{RepeatQuery, Scraper};
