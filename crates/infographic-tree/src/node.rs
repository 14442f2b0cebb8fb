//! Owned, detached tree nodes.
//!
//! [`Node`] is the shape used for fragments that live outside a [`Document`]:
//! parsed renderer output, fallback replacements and test fixtures. Adopting a
//! `Node` into a document assigns fresh [`NodeId`]s to the whole subtree.
//!
//! [`Document`]: crate::Document
//! [`NodeId`]: crate::NodeId

/// Element attributes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Iterate `(name, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tokens of the `class` attribute, split on ASCII whitespace.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.get("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

/// Detached element with owned children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source (case preserved).
    pub tag: String,
    /// Element attributes.
    pub attrs: Attributes,
    /// Child nodes in reading order.
    pub children: Vec<Node>,
}

/// Detached tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// `<!DOCTYPE ...>` content after the keyword, e.g. `html`.
    Doctype(String),
}

impl Node {
    /// Create an element node with the given tag.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            ..Default::default()
        })
    }

    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Set an attribute. No-op on non-element nodes.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element(element) = &mut self {
            element.attrs.set(name, value);
        }
        self
    }

    /// Append a child. No-op on non-element nodes.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        if let Self::Element(element) = &mut self {
            element.children.push(child);
        }
        self
    }

    /// Replace all children. No-op on non-element nodes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        if let Self::Element(element) = &mut self {
            element.children = children;
        }
        self
    }

    /// Element payload, if this is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Comment(_) | Self::Doctype(_) => None,
        }
    }

    /// Tag name, if this is an element.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|element| element.tag.as_str())
    }

    /// Concatenated descendant text with whitespace kept verbatim.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Text(value) => out.push_str(value),
            Self::Element(element) => {
                for child in &element.children {
                    child.push_text(out);
                }
            }
            Self::Comment(_) | Self::Doctype(_) => {}
        }
    }

    /// Whether this is a text node holding only whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_set_replaces_in_place() {
        let mut attrs: Attributes = [("id", "a"), ("class", "b")].into_iter().collect();
        attrs.set("id", "c");

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("id", "c"), ("class", "b")]);
    }

    #[test]
    fn test_class_list_splits_whitespace() {
        let attrs: Attributes = [("class", "  language-infographic\tshiki ")]
            .into_iter()
            .collect();
        let classes: Vec<_> = attrs.class_list().collect();
        assert_eq!(classes, vec!["language-infographic", "shiki"]);
    }

    #[test]
    fn test_class_list_missing() {
        assert_eq!(Attributes::new().class_list().count(), 0);
    }

    #[test]
    fn test_text_content_keeps_whitespace() {
        let node = Node::element("pre").with_child(
            Node::element("code")
                .with_child(Node::text("a\n  b"))
                .with_child(Node::element("span").with_child(Node::text(" c\n"))),
        );
        assert_eq!(node.text_content(), "a\n  b c\n");
    }

    #[test]
    fn test_builders_ignore_text_nodes() {
        let node = Node::text("x").with_attr("id", "y").with_child(Node::text("z"));
        assert_eq!(node, Node::text("x"));
    }

    #[test]
    fn test_is_whitespace() {
        assert!(Node::text(" \n\t").is_whitespace());
        assert!(!Node::text(" a ").is_whitespace());
        assert!(!Node::element("br").is_whitespace());
    }
}
