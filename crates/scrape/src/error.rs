// ABOUTME: Error types for the scraper including the ErrorCode enum and ScrapeError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the different categories of scrape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    InvalidUrl,
    Fetch,
    Timeout,
    NoDocument,
    SectionNotFound,
    NoItemsFound,
    Extract,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Validation => "validation error",
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NoDocument => "no document",
            ErrorCode::SectionNotFound => "section not found",
            ErrorCode::NoItemsFound => "no items found",
            ErrorCode::Extract => "extraction error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for scrape operations.
#[derive(Debug, thiserror::Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    /// Field name for extraction failures.
    pub field: Option<String>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dputils: {}", self.op)?;
        if !self.url.is_empty() {
            write!(f, " {}", self.url)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref field) = self.field {
            write!(f, " for field `{}`", field)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScrapeError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            field: None,
            source,
        }
    }

    /// Create a Validation error for a malformed selector description.
    pub fn validation(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Validation, String::new(), op, source)
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create a NoDocument error.
    pub fn no_document(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NoDocument,
            url,
            op,
            Some(anyhow::anyhow!("page was not fetched")),
        )
    }

    /// Create a SectionNotFound error.
    pub fn section_not_found(url: impl Into<String>, target: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::SectionNotFound,
            url,
            "GetRepeatingData",
            Some(anyhow::anyhow!("no element matches {}", target)),
        )
    }

    /// Create a NoItemsFound error.
    pub fn no_items_found(url: impl Into<String>, items: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::NoItemsFound,
            url,
            "GetRepeatingData",
            Some(anyhow::anyhow!("no element matches {}", items)),
        )
    }

    /// Create an Extract error for a single field.
    pub fn extract(field: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::new(ErrorCode::Extract, String::new(), "Extract", Some(source))
        }
    }

    /// Attach the page URL when the error was raised without one.
    pub fn with_url(mut self, url: &str) -> Self {
        if self.url.is_empty() {
            self.url = url.to_string();
        }
        self
    }

    /// Returns true if this is a Validation error.
    pub fn is_validation(&self) -> bool {
        self.code == ErrorCode::Validation
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch or Timeout error.
    pub fn is_fetch(&self) -> bool {
        matches!(self.code, ErrorCode::Fetch | ErrorCode::Timeout)
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a NoDocument error.
    pub fn is_no_document(&self) -> bool {
        self.code == ErrorCode::NoDocument
    }

    /// Returns true if this is a SectionNotFound error.
    pub fn is_section_not_found(&self) -> bool {
        self.code == ErrorCode::SectionNotFound
    }

    /// Returns true if this is a NoItemsFound error.
    pub fn is_no_items_found(&self) -> bool {
        self.code == ErrorCode::NoItemsFound
    }

    /// Returns true if this is an Extract error.
    pub fn is_extract(&self) -> bool {
        self.code == ErrorCode::Extract
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_field_and_source() {
        let err = ScrapeError::extract("price", anyhow::anyhow!("no element matches span"))
            .with_url("https://example.com");
        assert_eq!(
            err.to_string(),
            "dputils: Extract https://example.com: extraction error for field `price`: no element matches span"
        );
    }

    #[test]
    fn test_with_url_keeps_existing_url() {
        let err = ScrapeError::fetch("https://a.example", "Fetch", None).with_url("https://b.example");
        assert_eq!(err.url, "https://a.example");
    }

    #[test]
    fn test_timeout_counts_as_fetch() {
        let err = ScrapeError::timeout("https://example.com", "Fetch", None);
        assert!(err.is_fetch());
        assert!(err.is_timeout());
        assert!(!ScrapeError::fetch("u", "Fetch", None).is_timeout());
    }
}
