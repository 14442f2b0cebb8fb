//! HTML document tree for infographic rendering.
//!
//! Provides:
//! - [`Document`]: arena tree whose nodes keep a stable [`NodeId`] while
//!   siblings are replaced or removed
//! - [`Node`]: owned, detached subtrees for fragments and replacements
//! - [`parse_fragment`] / [`serialize_node`]: markup conversion built on `quick-xml`
//! - [`strip_xml_declaration`]: cleanup for renderer output
//!
//! # Example
//!
//! ```
//! use infographic_tree::{Document, Node};
//!
//! let mut doc = Document::parse("<p>a</p><pre>b</pre>").unwrap();
//! let pre = doc.children(doc.root())[1];
//! doc.replace(pre, Node::element("svg"));
//! assert_eq!(doc.serialize(), "<p>a</p><svg></svg>");
//! ```

mod document;
mod entities;
mod error;
mod node;
mod parser;
mod raw_text;
mod serializer;

use std::sync::LazyLock;

use regex::Regex;

pub use document::{Descendants, Document, ElementData, NodeId, NodeKind};
pub use error::ParseError;
pub use node::{Attributes, Element, Node};
pub use parser::{is_void_element, parse_fragment};
pub use serializer::serialize_node;

/// Leading XML declaration and optional doctype.
static XML_PROLOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<\?xml[^>]*\?>\s*(?:<!DOCTYPE[^>\[]*(?:\[[^\]]*\])?\s*>\s*)?")
        .expect("invalid XML prolog regex")
});

/// Remove a leading `<?xml ...?>` declaration (and a doctype right after it).
///
/// Renderers that emit standalone SVG documents prefix them with a prolog
/// that has no place inside an HTML tree.
#[must_use]
pub fn strip_xml_declaration(markup: &str) -> &str {
    XML_PROLOG_PATTERN
        .find(markup)
        .map_or(markup, |prolog| &markup[prolog.end()..])
}
