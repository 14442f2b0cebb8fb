//! Diagnostics channel for one processing run.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::RULE_ID;

/// Diagnostic attached to a processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Human-readable description.
    pub reason: String,
    /// Machine-readable rule identifier.
    pub rule_id: String,
    /// Name of the component that produced the message.
    pub source: String,
    /// Tag names from the root down to the affected node.
    pub ancestors: Vec<String>,
    /// Whether the message aborted the run.
    pub fatal: bool,
    /// Documentation link.
    pub url: Option<String>,
}

impl Message {
    /// Create a non-fatal message from this crate.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            rule_id: RULE_ID.to_owned(),
            source: RULE_ID.to_owned(),
            ancestors: Vec::new(),
            fatal: false,
            url: None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}:{}]", self.reason, self.source, self.rule_id)
    }
}

/// Per-document processing state handed through the pipeline.
///
/// Collects [`Message`]s from the pipeline and from fallback policies.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    path: Option<PathBuf>,
    pub messages: Vec<Message>,
}

impl ProcessingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a document read from `path`.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a non-fatal warning.
    pub fn warn(&mut self, reason: impl Into<String>) {
        self.messages.push(Message::new(reason));
    }

    /// Whether a fatal message was recorded.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.messages.iter().any(|message| message.fatal)
    }
}
