// ABOUTME: Selector-driven extraction of a record from a DOM node.
// ABOUTME: Resolves each named selector independently and dispatches on its output kind.

//! Record extraction.
//!
//! Key behaviors:
//! - Every field is located independently with `find` from the context node.
//! - `text` output is the trimmed text content; attribute kinds read that
//!   attribute; `object` hands back the matched element.
//! - A field whose element or attribute is absent is a miss. With
//!   `suppress_errors` it becomes [`FieldValue::Missing`]; otherwise the whole
//!   call fails on the first miss and no partial record is returned.

use anyhow::anyhow;
use scraper::ElementRef;
use tracing::debug;

use crate::dom;
use crate::error::{Result, ScrapeError};
use crate::record::{FieldValue, Record};
use crate::selector::{OutputKind, Selector, SelectorSet};

/// Extracts one record from `node` using every selector in `fields`.
///
/// Only descendants of `node` are searched.
pub fn extract<'a>(
    node: ElementRef<'a>,
    fields: &SelectorSet,
    suppress_errors: bool,
) -> Result<Record<'a>> {
    extract_with(node, fields, suppress_errors, Search::Descendants)
}

/// Extracts one record from a whole document, so `root` itself can match.
pub fn extract_document<'a>(
    root: ElementRef<'a>,
    fields: &SelectorSet,
    suppress_errors: bool,
) -> Result<Record<'a>> {
    extract_with(root, fields, suppress_errors, Search::Subtree)
}

#[derive(Debug, Clone, Copy)]
enum Search {
    Descendants,
    Subtree,
}

impl Search {
    fn find<'a>(self, selector: &Selector, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Search::Descendants => selector.find_in(node),
            Search::Subtree => selector.find_from(node),
        }
    }
}

fn extract_with<'a>(
    node: ElementRef<'a>,
    fields: &SelectorSet,
    suppress_errors: bool,
    search: Search,
) -> Result<Record<'a>> {
    let mut record = Record::with_capacity(fields.len());
    for (name, selector) in fields.iter() {
        let found = search
            .find(selector, node)
            .ok_or_else(|| anyhow!("no element matches {}", selector))
            .and_then(|el| output(el, selector.output_kind()));
        match found {
            Ok(value) => record.push(name, value),
            Err(cause) if suppress_errors => {
                debug!(field = name, %cause, "field missing");
                record.push(name, FieldValue::Missing);
            }
            Err(cause) => return Err(ScrapeError::extract(name, cause)),
        }
    }
    Ok(record)
}

/// Resolves a single selector against the descendants of `node`.
pub fn resolve<'a>(node: ElementRef<'a>, selector: &Selector) -> anyhow::Result<FieldValue<'a>> {
    let el = selector
        .find_in(node)
        .ok_or_else(|| anyhow!("no element matches {}", selector))?;
    output(el, selector.output_kind())
}

fn output<'a>(el: ElementRef<'a>, kind: OutputKind) -> anyhow::Result<FieldValue<'a>> {
    match kind.attribute() {
        Some(attr) => el
            .value()
            .attr(attr)
            .map(|v| FieldValue::Text(v.to_string()))
            .ok_or_else(|| anyhow!("<{}> has no `{}` attribute", el.value().name(), attr)),
        None if kind == OutputKind::Object => Ok(FieldValue::Node(el)),
        None => Ok(FieldValue::Text(dom::text_of(&el))),
    }
}
