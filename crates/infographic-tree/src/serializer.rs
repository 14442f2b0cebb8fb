//! HTML serializer for detached nodes.

use std::fmt::Write;

use crate::node::Node;
use crate::parser::is_void_element;

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a detached node (and its subtree) as HTML.
#[must_use]
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

pub(crate) fn write_node(node: &Node, out: &mut String) {
    write_node_in(node, out, false);
}

fn write_node_in(node: &Node, out: &mut String, raw_text: bool) {
    match node {
        Node::Text(value) if raw_text => out.push_str(value),
        Node::Text(value) => escape_into(value, false, out),
        Node::Comment(value) => {
            let _ = write!(out, "<!--{value}-->");
        }
        Node::Doctype(value) => {
            let _ = write!(out, "<!DOCTYPE {value}>");
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (key, value) in element.attrs.iter() {
                let _ = write!(out, " {key}=\"");
                escape_into(value, true, out);
                out.push('"');
            }

            if is_void_element(&element.tag) && element.children.is_empty() {
                out.push_str(" />");
                return;
            }
            out.push('>');

            let raw = RAW_TEXT_ELEMENTS
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(&element.tag));
            for child in &element.children {
                write_node_in(child, out, raw);
            }

            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

/// Escape markup-significant characters; quotes only inside attribute values.
fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
