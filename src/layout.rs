//! Layout values returned by custom layout renderers and their resolution to
//! a markup string.
//!
//! Layouts come in three forms: a finished string, a structured markup tree,
//! or a dynamic JSON value (layouts loaded from external sources). Dynamic
//! values resolve by deserializing into the tree format; anything else is an
//! author error with a fixed message, never retryable.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// What a layout renderer may hand back.
#[derive(Clone, Debug)]
pub enum Layout {
    Html(String),
    Tree(MarkupNode),
    Value(Value),
}

impl From<String> for Layout {
    fn from(s: String) -> Self {
        Layout::Html(s)
    }
}

impl From<MarkupNode> for Layout {
    fn from(n: MarkupNode) -> Self {
        Layout::Tree(n)
    }
}

/// One element in the markup-tree layout format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MarkupChild>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkupChild {
    Text(String),
    Node(MarkupNode),
}

impl MarkupNode {
    pub fn new(tag: impl Into<String>) -> Self {
        MarkupNode {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, node: MarkupNode) -> Self {
        self.children.push(MarkupChild::Node(node));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(MarkupChild::Text(text.into()));
        self
    }

    /// Serializes the tree into a detached buffer.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                MarkupChild::Text(t) => out.push_str(&escape_text(t)),
                MarkupChild::Node(n) => n.write_into(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Built-in document shell used when a route defines no layout renderer.
pub fn default_layout(content: &str) -> String {
    format!(
        "\n<html>\n<head>\n  <meta charset=\"UTF-8\"/>\n</head>\n<body>\n  {}\n</body>\n</html>",
        content
    )
}

/// Resolves a layout value to its final markup string.
///
/// Dynamic values must be a string or deserialize into [`MarkupNode`];
/// everything else fails with [`PageError::UnsupportedLayout`].
pub fn resolve_layout(layout: Layout) -> Result<String, PageError> {
    match layout {
        Layout::Html(s) => Ok(s),
        Layout::Tree(node) => Ok(node.to_html()),
        Layout::Value(Value::String(s)) => Ok(s),
        Layout::Value(value) => serde_json::from_value::<MarkupNode>(value)
            .map(|node| node.to_html())
            .map_err(|_| PageError::UnsupportedLayout),
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}
