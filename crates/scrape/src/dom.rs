// ABOUTME: Tag-and-attribute lookup over a parsed scraper DOM.
// ABOUTME: Implements find/find_all with soup-style class matching, searching descendants in document order.

use std::collections::BTreeMap;

use scraper::node::Element;
use scraper::ElementRef;

/// Returns the first descendant of `node` whose tag and attributes match.
///
/// The node itself is not a candidate. Tag names compare case-insensitively.
pub fn find<'a>(
    node: ElementRef<'a>,
    tag: &str,
    attrs: &BTreeMap<String, String>,
) -> Option<ElementRef<'a>> {
    descendants(node).find(|el| matches(el.value(), tag, attrs))
}

/// Returns every matching descendant of `node` in document order.
pub fn find_all<'a>(
    node: ElementRef<'a>,
    tag: &str,
    attrs: &BTreeMap<String, String>,
) -> Vec<ElementRef<'a>> {
    descendants(node)
        .filter(|el| matches(el.value(), tag, attrs))
        .collect()
}

/// Like [`find`], but `node` itself is also a candidate.
pub fn find_from<'a>(
    node: ElementRef<'a>,
    tag: &str,
    attrs: &BTreeMap<String, String>,
) -> Option<ElementRef<'a>> {
    subtree(node).find(|el| matches(el.value(), tag, attrs))
}

/// Like [`find_all`], but `node` itself is also a candidate.
pub fn find_all_from<'a>(
    node: ElementRef<'a>,
    tag: &str,
    attrs: &BTreeMap<String, String>,
) -> Vec<ElementRef<'a>> {
    subtree(node)
        .filter(|el| matches(el.value(), tag, attrs))
        .collect()
}

/// Trimmed text content of an element.
pub fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn descendants<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    node.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn subtree<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    std::iter::once(node).chain(descendants(node))
}

/// Checks whether an element has the given tag and carries every wanted attribute.
pub fn matches(element: &Element, tag: &str, attrs: &BTreeMap<String, String>) -> bool {
    element.name().eq_ignore_ascii_case(tag)
        && attrs
            .iter()
            .all(|(name, wanted)| attr_matches(element, name, wanted))
}

fn attr_matches(element: &Element, name: &str, wanted: &str) -> bool {
    let Some(actual) = element.attr(name) else {
        return false;
    };
    if name.eq_ignore_ascii_case("class") {
        class_matches(actual, wanted)
    } else {
        actual == wanted
    }
}

/// A single wanted class matches any token; several must equal the full class list.
fn class_matches(actual: &str, wanted: &str) -> bool {
    let wanted: Vec<&str> = wanted.split_whitespace().collect();
    match wanted.as_slice() {
        [] => actual.trim().is_empty(),
        [single] => actual.split_whitespace().any(|c| c == *single),
        _ => actual.split_whitespace().eq(wanted.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const HTML: &str = r#"
        <html><body>
            <div class="list main">
                <DIV class="item">one</DIV>
                <div class="item featured" id="second">two</div>
                <div class="item"><div class="item">nested</div></div>
            </div>
            <span class="price">10</span>
        </body></html>
    "#;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_find_first_in_document_order() {
        let doc = Html::parse_document(HTML);
        let found = find(doc.root_element(), "div", &attrs(&[("class", "item")])).unwrap();
        assert_eq!(text_of(&found), "one");
    }

    #[test]
    fn test_find_all_is_recursive() {
        let doc = Html::parse_document(HTML);
        let all = find_all(doc.root_element(), "div", &attrs(&[("class", "item")]));
        let texts: Vec<String> = all.iter().map(text_of).collect();
        assert_eq!(texts, vec!["one", "two", "nested", "nested"]);
    }

    #[test]
    fn test_multi_class_requires_full_list() {
        let doc = Html::parse_document(HTML);
        let root = doc.root_element();
        assert!(find(root, "div", &attrs(&[("class", "list main")])).is_some());
        assert!(find(root, "div", &attrs(&[("class", "main")])).is_some());
        assert!(find(root, "div", &attrs(&[("class", "main list")])).is_none());
    }

    #[test]
    fn test_other_attributes_match_exactly() {
        let doc = Html::parse_document(HTML);
        let root = doc.root_element();
        let hit = find(root, "div", &attrs(&[("id", "second")])).unwrap();
        assert_eq!(text_of(&hit), "two");
        assert!(find(root, "div", &attrs(&[("id", "sec")])).is_none());
    }

    #[test]
    fn test_node_itself_is_not_a_candidate() {
        let doc = Html::parse_document(HTML);
        let span = find(doc.root_element(), "span", &BTreeMap::new()).unwrap();
        assert!(find(span, "span", &BTreeMap::new()).is_none());
    }

    #[test]
    fn test_find_from_includes_node() {
        let doc = Html::parse_document(HTML);
        let root = doc.root_element();
        assert!(find(root, "html", &BTreeMap::new()).is_none());
        assert_eq!(
            find_from(root, "html", &BTreeMap::new()).map(|el| el.value().name().to_string()),
            Some("html".to_string())
        );
        let items = find_all_from(root, "div", &attrs(&[("class", "item")]));
        assert_eq!(items.len(), 4);
    }
}
