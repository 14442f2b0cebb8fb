//! Error types for the infographic pipeline.

use infographic_render::RenderError;
use infographic_tree::ParseError;

use crate::consts::{DOCS_URL, RULE_ID};
use crate::context::Message;

/// Render failure that aborted the whole run (no fallback configured).
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct FatalRenderError {
    /// Human-readable description embedding the cause.
    pub reason: String,
    /// Machine-readable rule identifier.
    pub rule_id: &'static str,
    /// Name of the component that raised the error.
    pub source_id: &'static str,
    /// Tag names from the root down to the failed block.
    pub ancestors: Vec<String>,
    /// Always `true`; kept for parity with [`Message`].
    pub fatal: bool,
    /// Documentation link.
    pub url: &'static str,
    /// The renderer's failure.
    #[source]
    pub cause: RenderError,
}

impl FatalRenderError {
    pub(crate) fn new(cause: RenderError, ancestors: Vec<String>) -> Self {
        Self {
            reason: format!("Failed to render infographic: {cause}"),
            rule_id: RULE_ID,
            source_id: RULE_ID,
            ancestors,
            fatal: true,
            url: DOCS_URL,
            cause,
        }
    }

    /// The diagnostic form of this error.
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message {
            reason: self.reason.clone(),
            rule_id: self.rule_id.to_owned(),
            source: self.source_id.to_owned(),
            ancestors: self.ancestors.clone(),
            fatal: self.fatal,
            url: Some(self.url.to_owned()),
        }
    }
}

/// Error from processing a document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessError {
    /// The input markup could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A block failed to render and no fallback policy handled it.
    #[error(transparent)]
    Render(Box<FatalRenderError>),
}

impl From<FatalRenderError> for ProcessError {
    fn from(error: FatalRenderError) -> Self {
        Self::Render(Box::new(error))
    }
}
