// ABOUTME: Declarative selector model: tag name, matching attributes, and the output kind to extract.
// ABOUTME: SelectorSet keeps named selectors in insertion order and loads from JSON descriptions.

//! Selector definitions.
//!
//! A [`Selector`] describes one DOM target (a tag name plus attributes that
//! must match) and what to pull out of it. A [`SelectorSet`] names several
//! selectors so one extraction call can produce a whole record.
//!
//! Selector sets can be written as JSON:
//!
//! ```json
//! {
//!   "title": { "tag": "h1", "id": "firstHeading" },
//!   "link":  { "tag": "a", "class": "product", "output": "href" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use scraper::ElementRef;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom;
use crate::error::{Result, ScrapeError};

/// Tag used when a selector names none.
pub const DEFAULT_TAG: &str = "div";

/// What to extract from a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    #[default]
    Text,
    Href,
    Src,
    Object,
    Title,
    Alt,
    Value,
}

impl OutputKind {
    /// All recognised output kinds.
    pub const ALL: [OutputKind; 7] = [
        OutputKind::Text,
        OutputKind::Href,
        OutputKind::Src,
        OutputKind::Object,
        OutputKind::Title,
        OutputKind::Alt,
        OutputKind::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Text => "text",
            OutputKind::Href => "href",
            OutputKind::Src => "src",
            OutputKind::Object => "object",
            OutputKind::Title => "title",
            OutputKind::Alt => "alt",
            OutputKind::Value => "value",
        }
    }

    /// The attribute read for this kind, or `None` for text and object output.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            OutputKind::Text | OutputKind::Object => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = OutputKind::ALL.iter().map(|k| k.as_str()).collect();
                ScrapeError::validation(
                    "Selector",
                    Some(anyhow::anyhow!(
                        "output must be one of {}, got {:?}",
                        names.join(", "),
                        s
                    )),
                )
            })
    }
}

/// One field to extract: a tag, the attributes it must carry, and the output kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SelectorDef", into = "SelectorDef")]
pub struct Selector {
    tag: String,
    attributes: BTreeMap<String, String>,
    output: OutputKind,
}

impl Selector {
    /// Create a selector for `tag` with text output and no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            output: OutputKind::Text,
        }
    }

    /// Set the output kind.
    pub fn output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }

    /// Set the output kind from its name, failing on unknown names.
    pub fn output_named(self, output: &str) -> Result<Self> {
        Ok(self.output(output.parse()?))
    }

    /// Require the given CSS class (stored as `attributes["class"]`).
    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Require the given element id (stored as `attributes["id"]`).
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Require an attribute with an exact value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Merge a whole attribute map.
    pub fn attrs<I, K, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attrs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn output_kind(&self) -> OutputKind {
        self.output
    }

    /// First descendant of `node` matching this selector.
    pub fn find_in<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        dom::find(node, &self.tag, &self.attributes)
    }

    /// All descendants of `node` matching this selector, in document order.
    pub fn find_all_in<'a>(&self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        dom::find_all(node, &self.tag, &self.attributes)
    }

    /// First match in the subtree rooted at `node`, `node` included.
    pub fn find_from<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        dom::find_from(node, &self.tag, &self.attributes)
    }

    /// All matches in the subtree rooted at `node`, `node` included.
    pub fn find_all_from<'a>(&self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        dom::find_all_from(node, &self.tag, &self.attributes)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::new(DEFAULT_TAG)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag: {} attrs: {{", self.tag)?;
        for (i, (k, v)) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", k, v)?;
        }
        write!(f, "}} output: {}", self.output)
    }
}

/// Serialized form of a [`Selector`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SelectorDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, String>,
}

impl TryFrom<SelectorDef> for Selector {
    type Error = ScrapeError;

    fn try_from(def: SelectorDef) -> Result<Self> {
        let mut selector = Selector::new(def.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()))
            .attrs(def.attrs);
        if let Some(output) = def.output {
            selector = selector.output_named(&output)?;
        }
        if let Some(class) = def.class {
            selector = selector.class(class);
        }
        if let Some(id) = def.id {
            selector = selector.id(id);
        }
        Ok(selector)
    }
}

impl From<Selector> for SelectorDef {
    fn from(selector: Selector) -> Self {
        SelectorDef {
            tag: Some(selector.tag),
            output: Some(selector.output.as_str().to_string()),
            class: None,
            id: None,
            attrs: selector.attributes,
        }
    }
}

/// Named selectors, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    fields: Vec<(String, Selector)>,
}

impl SelectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.insert(name, selector);
        self
    }

    /// Insert a field. An existing field with the same name is replaced in place
    /// and its previous selector returned.
    pub fn insert(&mut self, name: impl Into<String>, selector: Selector) -> Option<Selector> {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, selector)),
            None => {
                self.fields.push((name, selector));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Selector> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Parse a selector set from a JSON object of `name -> selector`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ScrapeError::validation("SelectorSet", Some(anyhow::anyhow!("invalid selector set: {}", e)))
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Selector)> for SelectorSet {
    fn from_iter<I: IntoIterator<Item = (K, Selector)>>(iter: I) -> Self {
        let mut set = SelectorSet::new();
        for (name, selector) in iter {
            set.insert(name, selector);
        }
        set
    }
}

impl Serialize for SelectorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, selector) in &self.fields {
            map.serialize_entry(name, selector)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SelectorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = SelectorSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to selectors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SelectorSet, A::Error> {
                let mut set = SelectorSet::new();
                while let Some((name, selector)) = access.next_entry::<String, Selector>()? {
                    set.insert(name, selector);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}
