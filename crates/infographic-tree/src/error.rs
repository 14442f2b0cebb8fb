//! Error types for document parsing.

use std::str::Utf8Error;

/// Error while parsing markup into a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Tokenizer error.
    #[error("markup parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute.
    #[error("markup attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Invalid UTF-8 in a name or text run.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] Utf8Error),
}
