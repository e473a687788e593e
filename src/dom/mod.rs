pub mod metadata;
pub mod parser;
pub mod rewrite;

use std::collections::HashMap;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text content is emitted raw (no entity escaping).
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Mutable node of a rendered content fragment.
///
/// Rendered Markdown and essay responses are parsed into this tree so link
/// rewriting can edit attributes before the fragment is committed back to
/// the store as a string.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: HashMap::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: HashMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Recursively count all nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Collect all text content recursively
    pub fn collect_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text_inner(&mut buf);
        buf
    }

    fn collect_text_inner(&self, buf: &mut String) {
        if !self.text.is_empty() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(self.text.trim());
        }
        for child in &self.children {
            child.collect_text_inner(buf);
        }
    }

    /// First element (depth-first, document order) matching the predicate.
    pub fn find_element(&self, pred: &impl Fn(&DomNode) -> bool) -> Option<&DomNode> {
        if self.node_type == NodeType::Element && pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_element(pred))
    }

    /// Visit every element in the subtree, depth-first.
    pub fn for_each_element(&self, f: &mut impl FnMut(&DomNode)) {
        if self.node_type == NodeType::Element {
            f(self);
        }
        for child in &self.children {
            child.for_each_element(f);
        }
    }

    /// Visit every element in the subtree, depth-first, mutably.
    pub fn for_each_element_mut(&mut self, f: &mut impl FnMut(&mut DomNode)) {
        if self.node_type == NodeType::Element {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_element_mut(f);
        }
    }

    fn serialize_into(&self, out: &mut String, raw_text: bool) {
        match self.node_type {
            NodeType::Document => {
                for child in &self.children {
                    child.serialize_into(out, false);
                }
            }
            NodeType::Text => {
                if raw_text {
                    out.push_str(&self.text);
                } else {
                    push_escaped_text(out, &self.text);
                }
            }
            NodeType::Element => {
                out.push('<');
                out.push_str(&self.tag);
                // Sorted so serialization is deterministic
                let mut attrs: Vec<_> = self.attributes.iter().collect();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    push_escaped_attr(out, value);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&self.tag.as_str()) {
                    return;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
                for child in &self.children {
                    child.serialize_into(out, raw);
                }
                out.push_str("</");
                out.push_str(&self.tag);
                out.push('>');
            }
        }
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
}

/// Parsed content fragment.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
}

impl DomTree {
    /// Whether any element in the fragment carries the given id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.root.find_element(&|el| el.attr("id") == Some(id)).is_some()
    }

    /// Serialize the fragment back to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.serialize_into(&mut out, false);
        out
    }
}
