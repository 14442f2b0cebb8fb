//! HTML fragment parser built on the `quick-xml` tokenizer.
//!
//! The tokenizer runs with end-name checks disabled; tree construction is done
//! here with a stack of open elements so HTML void elements and stray end tags
//! do not derail the structure.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_reference, normalize_markup};
use crate::error::ParseError;
use crate::node::{Attributes, Element, Node};
use crate::raw_text::{Segment, split_raw_text};

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `tag` is an HTML void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(tag))
}

/// Parse markup into a list of top-level nodes.
///
/// Declarations and processing instructions are dropped; a doctype is kept.
/// `script` and `style` content is kept verbatim as a single text node.
/// Unclosed elements are closed at end of input.
///
/// # Errors
///
/// Returns [`ParseError`] when the tokenizer rejects the input, for example
/// on an unterminated tag.
pub fn parse_fragment(html: &str) -> Result<Vec<Node>, ParseError> {
    let mut builder = TreeBuilder::default();
    for segment in split_raw_text(html) {
        match segment {
            Segment::Markup(markup) => tokenize(&normalize_markup(markup), &mut builder)?,
            Segment::RawText(text) => builder.push_text(text),
            Segment::EscapableText(text) => {
                tokenize(&normalize_markup(&text.replace('<', "&lt;")), &mut builder)?;
            }
        }
    }
    Ok(builder.finish())
}

/// Feed the events of one markup run into `builder`.
fn tokenize(markup: &str, builder: &mut TreeBuilder) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let element = decode_element(&reader, &e);
                if is_void_element(&element.tag) {
                    builder.push(Node::Element(element));
                } else {
                    builder.open.push(element);
                }
            }
            Event::Empty(e) => {
                builder.push(Node::Element(decode_element(&reader, &e)));
            }
            Event::End(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                builder.close(&tag);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                builder.push_text(&text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                builder.push_text(&decode_reference(&entity));
            }
            Event::CData(e) => {
                builder.push_text(&String::from_utf8_lossy(&e));
            }
            Event::Comment(e) => {
                let comment = reader.decoder().decode(&e)?.into_owned();
                builder.push(Node::Comment(comment));
            }
            Event::DocType(e) => {
                let doctype = reader.decoder().decode(&e)?.into_owned();
                builder.push(Node::Doctype(doctype));
            }
            Event::Decl(_) | Event::PI(_) => {}
            Event::Eof => return Ok(()),
        }
    }
}

/// Stack of open elements plus the finished top-level nodes.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Element>,
    top: Vec<Node>,
}

impl TreeBuilder {
    fn siblings(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.top,
        }
    }

    fn push(&mut self, node: Node) {
        self.siblings().push(node);
    }

    /// Append text, merging with a preceding text node.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = self.siblings();
        if let Some(Node::Text(last)) = siblings.last_mut() {
            last.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_owned()));
        }
    }

    /// Close the nearest open element named `tag` and everything opened after it.
    ///
    /// End tags with no matching open element are ignored.
    fn close(&mut self, tag: &str) {
        let Some(position) = self
            .open
            .iter()
            .rposition(|element| element.tag.eq_ignore_ascii_case(tag))
        else {
            return;
        };
        while self.open.len() > position {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.pop();
        }
        self.top
    }
}

fn decode_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Element {
    Element {
        tag: decode_name(reader, e.name().as_ref()),
        attrs: decode_attrs(reader, e),
        children: Vec::new(),
    }
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

/// Decode attributes; malformed ones are skipped rather than failing the parse.
fn decode_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> Attributes {
    let mut attrs = Attributes::new();
    for attr in e.html_attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.set(key, value);
    }
    attrs
}
