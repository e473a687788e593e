//! HTML fragment parsing into the crate's mutable tree.

use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Tags whose children are dropped entirely (never rendered, never read).
/// `script` is deliberately kept: embedded `application/ld+json` blocks
/// carry essay metadata.
const SKIP_CHILDREN: &[&str] = &["style", "noscript", "svg"];

/// Parse an HTML fragment (rendered Markdown or an essay response) into a
/// DomTree rooted at a synthetic document node.
pub fn parse_fragment(html: &str) -> DomTree {
    let document = Html::parse_fragment(html);
    let root = convert_element(document.root_element());

    DomTree {
        root: DomNode::document(root.children),
    }
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return DomNode::element(tag, attributes, Vec::new());
    }

    let keep_whitespace = tag == "script";
    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if keep_whitespace || !s.trim().is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    DomNode::element(tag, attributes, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rendered_markdown_fragment() {
        let tree = parse_fragment("<h1>Hello</h1><p>Content <a href=\"/about\">link</a></p>");
        assert!(tree.root.node_count() > 3);
        let anchor = tree.root.find_element(&|el| el.tag == "a").unwrap();
        assert_eq!(anchor.attr("href"), Some("/about"));
    }

    #[test]
    fn keeps_script_text_for_metadata() {
        let tree = parse_fragment(
            r#"<div><script type="application/ld+json">[{"type":"essay"}]</script></div>"#,
        );
        let script = tree.root.find_element(&|el| el.tag == "script").unwrap();
        assert_eq!(script.collect_text(), r#"[{"type":"essay"}]"#);
    }

    #[test]
    fn drops_style_children() {
        let tree = parse_fragment("<p>Visible</p><style>p { color: red }</style>");
        let text = tree.root.collect_text();
        assert!(text.contains("Visible"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn round_trips_through_serializer() {
        let tree = parse_fragment(r#"<p id="x">hi</p>"#);
        assert_eq!(tree.to_html(), r#"<p id="x">hi</p>"#);
    }
}
