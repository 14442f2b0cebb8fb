//! Pipeline configuration.

use std::fmt;
use std::sync::Arc;

use infographic_render::{Dimension, RenderError, RenderOptions};
use infographic_tree::Node;
use serde_json::{Map, Value};

use crate::consts::DEFAULT_MARKER;
use crate::context::ProcessingContext;

/// Decides what replaces a block whose render failed.
///
/// Called with the failed node, the original specification text, the cause
/// and the processing context. `Some(node)` puts `node` in the block's place,
/// `None` removes the block.
pub type FallbackPolicy =
    Arc<dyn Fn(&Node, &str, &RenderError, &mut ProcessingContext) -> Option<Node> + Send + Sync>;

/// Options for processing a document.
///
/// Defaults: marker `infographic`, width `100%`, height `auto`, no renderer
/// overrides, no fallback (a failed render aborts the run).
///
/// # Example
///
/// ```
/// use infographic::Options;
/// use infographic_tree::Node;
///
/// let options = Options::default()
///     .width(640u32)
///     .renderer_option("theme", "dark")
///     .fallback(|_node, _spec, error, _ctx| {
///         Some(Node::element("p").with_child(Node::text(error.to_string())))
///     });
/// ```
#[derive(Clone)]
pub struct Options {
    pub(crate) marker: String,
    pub(crate) width: Dimension,
    pub(crate) height: Dimension,
    pub(crate) renderer_options: Map<String, Value>,
    pub(crate) fallback: Option<FallbackPolicy>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            width: Dimension::full_width(),
            height: Dimension::auto(),
            renderer_options: Map::new(),
            fallback: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("marker", &self.marker)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("renderer_options", &self.renderer_options)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Options {
    /// Set the marker name (`language-<name>`, `<name>`, `data-language="<name>"`).
    #[must_use]
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the default width passed to the renderer.
    #[must_use]
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    /// Set the default height passed to the renderer.
    #[must_use]
    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = height.into();
        self
    }

    /// Add one renderer-specific option override.
    #[must_use]
    pub fn renderer_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.renderer_options.insert(key.into(), value.into());
        self
    }

    /// Replace all renderer-specific option overrides.
    #[must_use]
    pub fn renderer_options(mut self, options: Map<String, Value>) -> Self {
        self.renderer_options = options;
        self
    }

    /// Set the fallback policy for failed renders.
    #[must_use]
    pub fn fallback<F>(mut self, policy: F) -> Self
    where
        F: Fn(&Node, &str, &RenderError, &mut ProcessingContext) -> Option<Node>
            + Send
            + Sync
            + 'static,
    {
        self.fallback = Some(Arc::new(policy));
        self
    }

    /// Set or clear the fallback policy from a shared handle.
    #[must_use]
    pub fn fallback_policy(mut self, policy: Option<FallbackPolicy>) -> Self {
        self.fallback = policy;
        self
    }

    #[must_use]
    pub fn marker_name(&self) -> &str {
        &self.marker
    }

    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Options passed to every render call: defaults, then overrides.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::merged(
            self.width.clone(),
            self.height.clone(),
            &self.renderer_options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.marker_name(), "infographic");
        assert!(!options.has_fallback());

        let render = options.render_options();
        assert_eq!(render.width, Dimension::Css("100%".to_owned()));
        assert_eq!(render.height, Dimension::Css("auto".to_owned()));
    }

    #[test]
    fn test_render_options_merge_overrides() {
        let options = Options::default()
            .width(800u32)
            .renderer_option("height", "400px")
            .renderer_option("theme", "dark");

        let render = options.render_options();
        assert_eq!(render.width, Dimension::Number(800.0));
        assert_eq!(render.height, Dimension::Css("400px".to_owned()));
        assert_eq!(render.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_debug_hides_policy() {
        let options = Options::default().fallback(|_, _, _, _| None);
        assert!(format!("{options:?}").contains("fallback: true"));
    }
}
