//! Recognizes elements that mark an infographic block.
//!
//! Three conventions are accepted, for `code` elements and for `pre` block
//! containers alike:
//! - class `language-<name>`, optionally followed by a delimiter and more text
//!   (`language-infographic-special`, as emitted by some highlighters)
//! - bare class `<name>`, exact token only
//! - attribute `data-language="<name>"`

use infographic_tree::{Document, ElementData, NodeId};

/// Characters allowed right after the language class in a compound class token.
const CLASS_DELIMITERS: [char; 3] = ['-', '_', ':'];

/// Inline code element tag.
pub(crate) const CODE_TAG: &str = "code";

/// Block container tag.
pub(crate) const BLOCK_CONTAINER_TAG: &str = "pre";

/// Matches infographic blocks by tag, class and data attribute.
#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    language_class: String,
}

impl Matcher {
    /// Create a matcher for the given marker name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            language_class: format!("language-{name}"),
            name,
        }
    }

    /// Whether the node marks an infographic block.
    ///
    /// Only `code` and `pre` elements can match; every other node kind is
    /// rejected.
    #[must_use]
    pub fn is_candidate(&self, doc: &Document, id: NodeId) -> bool {
        doc.element(id)
            .is_some_and(|element| self.is_candidate_element(element))
    }

    /// Whether an element marks an infographic block.
    #[must_use]
    pub fn is_candidate_element(&self, element: &ElementData) -> bool {
        (element.is(CODE_TAG) || element.is(BLOCK_CONTAINER_TAG)) && self.is_marked(element)
    }

    fn is_marked(&self, element: &ElementData) -> bool {
        element.attrs.class_list().any(|class| self.is_marker_class(class))
            || element.attrs.get("data-language") == Some(self.name.as_str())
    }

    fn is_marker_class(&self, class: &str) -> bool {
        if class == self.name {
            return true;
        }
        class
            .strip_prefix(self.language_class.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(CLASS_DELIMITERS))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_MARKER)
    }
}
