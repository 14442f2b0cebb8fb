//! What to do with an infographic that failed to render.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use infographic::{FallbackPolicy, ProcessingContext};
use infographic_render::RenderError;
use infographic_tree::Node;
use serde::Deserialize;

use crate::ConfigError;

/// Class of the element that replaces a failed block under [`OnError::Message`].
pub const ERROR_CLASS: &str = "infographic-error";

/// Failure handling selected in `render.on_error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Abort the run on the first failure.
    #[default]
    Fail,
    /// Drop the failed block.
    Remove,
    /// Leave the failed block as it was.
    Keep,
    /// Replace the failed block with an error notice.
    Message,
}

impl OnError {
    pub const VARIANTS: [&str; 4] = ["fail", "remove", "keep", "message"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Remove => "remove",
            Self::Keep => "keep",
            Self::Message => "message",
        }
    }

    /// Fallback policy implementing this mode; `None` for [`OnError::Fail`].
    ///
    /// Every handled failure is recorded as a warning on the processing
    /// context.
    #[must_use]
    pub fn fallback_policy(self) -> Option<FallbackPolicy> {
        let policy = match self {
            Self::Fail => return None,
            Self::Remove => shared(|_, _, error, ctx| {
                ctx.warn(format!("Removed infographic: {error}"));
                None
            }),
            Self::Keep => shared(|node, _, error, ctx| {
                ctx.warn(format!("Kept infographic source: {error}"));
                Some(node.clone())
            }),
            Self::Message => shared(|_, _, error, ctx| {
                ctx.warn(format!("Replaced infographic with error notice: {error}"));
                Some(
                    Node::element("div")
                        .with_attr("class", ERROR_CLASS)
                        .with_child(Node::text(format!("Failed to render infographic: {error}"))),
                )
            }),
        };
        Some(policy)
    }
}

fn shared<F>(policy: F) -> FallbackPolicy
where
    F: Fn(&Node, &str, &RenderError, &mut ProcessingContext) -> Option<Node> + Send + Sync + 'static,
{
    Arc::new(policy)
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnError {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "remove" => Ok(Self::Remove),
            "keep" => Ok(Self::Keep),
            "message" => Ok(Self::Message),
            other => Err(ConfigError::Validation(format!(
                "unknown on_error value '{other}', expected one of: {}",
                Self::VARIANTS.join(", ")
            ))),
        }
    }
}
