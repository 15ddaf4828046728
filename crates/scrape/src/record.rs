// ABOUTME: Record type holding the named values extracted for one page or one repeated item.
// ABOUTME: Values are text, a missing marker, or a borrowed DOM node; records serialize to JSON objects.

use scraper::ElementRef;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Text content or an attribute value.
    Text(String),
    /// The matched element itself.
    Node(ElementRef<'a>),
    /// The field could not be resolved and errors were suppressed.
    Missing,
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<ElementRef<'a>> {
        match self {
            FieldValue::Node(el) => Some(*el),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Node(el) => serializer.serialize_str(&el.html()),
            FieldValue::Missing => serializer.serialize_none(),
        }
    }
}

/// Named values for one extracted record, in selector-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record<'a> {
    fields: Vec<(String, FieldValue<'a>)>,
}

impl<'a> Record<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: FieldValue<'a>) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue<'a>> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Text value of a field, `None` if absent, missing, or a node.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue<'a>)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
