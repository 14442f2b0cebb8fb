//! Infographic block rendering for HTML document trees.
//!
//! Finds code blocks marked as infographic specifications, renders every one
//! of them concurrently through a [`Renderer`], and replaces each block with
//! the rendered SVG. Blocks that fail to render are handed to a fallback
//! policy, or abort the run when none is configured.
//!
//! # Architecture
//!
//! - [`Matcher`]: recognizes marked `code` and `pre` elements
//! - [`collect`]: builds the ordered worklist of [`RenderJob`]s
//! - [`substitute`]: renders all jobs, then mutates the document in order
//! - [`Options`]: marker, dimensions, renderer overrides, fallback policy
//! - [`ProcessingContext`]: diagnostics channel for one document
//!
//! # Example
//!
//! ```
//! use infographic::{Infographic, ProcessingContext};
//! use infographic_render::{RenderError, RenderOptions, Renderer};
//!
//! struct Echo;
//!
//! impl Renderer for Echo {
//!     async fn render(&self, spec: &str, _options: &RenderOptions) -> Result<String, RenderError> {
//!         Ok(format!("<svg><text>{}</text></svg>", spec.trim()))
//!     }
//! }
//!
//! let html = r#"<pre><code class="language-infographic">list-row</code></pre>"#;
//! let mut ctx = ProcessingContext::new();
//! let output = tokio_test::block_on(Infographic::new(Echo).process_html(html, &mut ctx)).unwrap();
//! assert_eq!(output, "<svg><text>list-row</text></svg>");
//! ```

mod collector;
pub mod consts;
mod context;
mod error;
mod matcher;
mod options;
mod substitute;

use std::time::Instant;

use infographic_render::Renderer;
use infographic_tree::Document;

pub use collector::{RenderJob, collect};
pub use context::{Message, ProcessingContext};
pub use error::{FatalRenderError, ProcessError};
pub use matcher::Matcher;
pub use options::{FallbackPolicy, Options};
pub use substitute::{ProcessSummary, substitute};

/// Infographic pipeline bound to a renderer.
#[derive(Debug)]
pub struct Infographic<R> {
    renderer: R,
    options: Options,
    matcher: Matcher,
}

impl<R: Renderer> Infographic<R> {
    /// Create a pipeline with default options.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            options: Options::default(),
            matcher: Matcher::default(),
        }
    }

    /// Set pipeline options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.matcher = Matcher::new(options.marker_name());
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render every infographic block in `doc` in place.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Render`] when a block fails and no fallback
    /// policy is configured. `doc` is left unchanged in that case.
    pub async fn run(
        &self,
        doc: &mut Document,
        ctx: &mut ProcessingContext,
    ) -> Result<ProcessSummary, ProcessError> {
        let jobs = collect(doc, &self.matcher);
        if jobs.is_empty() {
            tracing::debug!("No infographic blocks found");
            return Ok(ProcessSummary::default());
        }

        let started_at = Instant::now();
        let summary = substitute(doc, &jobs, &self.renderer, &self.options, ctx).await?;
        tracing::info!(
            path = ?ctx.path(),
            rendered = summary.rendered,
            replaced = summary.replaced,
            removed = summary.removed,
            elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Processed infographic blocks"
        );
        Ok(summary)
    }

    /// Parse `html`, render its infographic blocks and serialize the result.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Parse`] for malformed markup and
    /// [`ProcessError::Render`] as described for [`Self::run`].
    pub async fn process_html(
        &self,
        html: &str,
        ctx: &mut ProcessingContext,
    ) -> Result<String, ProcessError> {
        let mut doc = Document::parse(html)?;
        self.run(&mut doc, ctx).await?;
        Ok(doc.serialize())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use infographic_render::{Dimension, RenderError, RenderOptions};
    use infographic_tree::Node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Renders `<svg>{spec}</svg>`; specs starting with `fail` are rejected.
    #[derive(Default)]
    struct StubRenderer {
        delays_ms: HashMap<String, u64>,
        outputs: HashMap<String, String>,
        calls: Mutex<Vec<(String, RenderOptions)>>,
    }

    impl StubRenderer {
        fn delay(mut self, spec: &str, ms: u64) -> Self {
            self.delays_ms.insert(spec.to_owned(), ms);
            self
        }

        fn output(mut self, spec: &str, markup: &str) -> Self {
            self.outputs.insert(spec.to_owned(), markup.to_owned());
            self
        }

        fn specs(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(spec, _)| spec.clone())
                .collect()
        }
    }

    impl Renderer for StubRenderer {
        async fn render(&self, spec: &str, options: &RenderOptions) -> Result<String, RenderError> {
            let spec = spec.trim().to_owned();
            self.calls
                .lock()
                .unwrap()
                .push((spec.clone(), options.clone()));

            if let Some(&ms) = self.delays_ms.get(&spec) {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            if spec.starts_with("fail") {
                return Err(RenderError::Rejected(format!("{spec} is invalid")));
            }
            Ok(self
                .outputs
                .get(&spec)
                .cloned()
                .unwrap_or_else(|| format!("<svg>{spec}</svg>")))
        }
    }

    /// Holds every render at a barrier until `parties` renders are in flight.
    struct BarrierRenderer {
        barrier: tokio::sync::Barrier,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl BarrierRenderer {
        fn new(parties: usize) -> Self {
            Self {
                barrier: tokio::sync::Barrier::new(parties),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl Renderer for BarrierRenderer {
        async fn render(&self, spec: &str, _options: &RenderOptions) -> Result<String, RenderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.barrier.wait().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("<svg>{}</svg>", spec.trim()))
        }
    }

    fn block(spec: &str) -> String {
        format!("<pre><code class=\"language-infographic\">{spec}</code></pre>")
    }

    fn process(
        pipeline: &Infographic<&StubRenderer>,
        html: &str,
    ) -> (Result<String, ProcessError>, ProcessingContext) {
        let mut ctx = ProcessingContext::new();
        let result = tokio_test::block_on(pipeline.process_html(html, &mut ctx));
        (result, ctx)
    }

    fn remove_on_error() -> Options {
        Options::default().fallback(|_, _, _, _| None)
    }

    #[test]
    fn test_no_blocks_leaves_document_unchanged() {
        let renderer = StubRenderer::default();
        let html = "<h1>Title</h1><pre><code class=\"language-rust\">fn main() {}</code></pre>";

        let (result, ctx) = process(&Infographic::new(&renderer), html);

        assert_eq!(result.unwrap(), html);
        assert!(renderer.specs().is_empty());
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_whitespace_only_block_not_rendered() {
        let renderer = StubRenderer::default();
        let html = block("  \n ");

        let (result, _) = process(&Infographic::new(&renderer), &html);

        assert_eq!(result.unwrap(), html);
        assert!(renderer.specs().is_empty());
    }

    #[test]
    fn test_results_substituted_in_document_order() {
        // First block finishes last.
        let renderer = StubRenderer::default()
            .delay("A", 30)
            .delay("B", 15)
            .delay("C", 1);
        let html = format!("<h1>T</h1>{}<p>mid</p>{}{}", block("A"), block("B"), block("C"));

        let (result, _) = process(&Infographic::new(&renderer), &html);

        assert_eq!(
            result.unwrap(),
            "<h1>T</h1><svg>A</svg><p>mid</p><svg>B</svg><svg>C</svg>"
        );
        assert_eq!(renderer.specs(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_renders_dispatched_concurrently() {
        let renderer = BarrierRenderer::new(4);
        let html = ["A", "B", "C", "D"].map(block).concat();
        let pipeline = Infographic::new(&renderer);
        let mut ctx = ProcessingContext::new();

        // Sequential dispatch would park the first render at the barrier forever.
        let result = tokio_test::block_on(async {
            tokio::time::timeout(
                Duration::from_secs(5),
                pipeline.process_html(&html, &mut ctx),
            )
            .await
        });

        assert_eq!(
            result.expect("renders did not run concurrently").unwrap(),
            "<svg>A</svg><svg>B</svg><svg>C</svg><svg>D</svg>"
        );
        assert_eq!(renderer.peak.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_script_and_stray_less_than_survive_substitution() {
        let renderer = StubRenderer::default();
        let html = format!(
            "<!DOCTYPE html><script>if (a<b) {{ x(); }}</script><p>1 &lt; 2</p>{}<p>end</p>",
            block("A")
        );

        let (result, _) = process(&Infographic::new(&renderer), &html);

        assert_eq!(
            result.unwrap(),
            "<!DOCTYPE html><script>if (a<b) { x(); }</script><p>1 &lt; 2</p><svg>A</svg><p>end</p>"
        );
        let html = format!("<p>1 < 2</p>{}", block("B"));
        let (bare, _) = process(&Infographic::new(&renderer), &html);
        assert_eq!(bare.unwrap(), "<p>1 &lt; 2</p><svg>B</svg>");
    }

    #[test]
    fn test_run_reports_summary() {
        let renderer = StubRenderer::default();
        let mut doc = Document::parse(&format!("{}{}", block("A"), block("fail B"))).unwrap();
        let mut ctx = ProcessingContext::new();

        let pipeline = Infographic::new(&renderer).with_options(remove_on_error());
        let summary = tokio_test::block_on(pipeline.run(&mut doc, &mut ctx)).unwrap();

        assert_eq!(
            summary,
            ProcessSummary {
                rendered: 1,
                replaced: 0,
                removed: 1,
            }
        );
    }

    #[test]
    fn test_pre_with_whitespace_siblings_is_replaced() {
        let renderer = StubRenderer::default();
        let html = "<div><pre>\n  <code class=\"language-infographic\">A</code>\n</pre></div>";

        let (result, _) = process(&Infographic::new(&renderer), html);

        assert_eq!(result.unwrap(), "<div><svg>A</svg></div>");
    }

    #[test]
    fn test_pre_with_other_content_is_untouched() {
        let renderer = StubRenderer::default();
        let html = "<pre>caption<code class=\"language-infographic\">A</code></pre>";

        let (result, _) = process(&Infographic::new(&renderer), html);

        assert_eq!(result.unwrap(), html);
        assert!(renderer.specs().is_empty());
    }

    #[test]
    fn test_inline_code_is_replaced_in_place() {
        let renderer = StubRenderer::default();
        let html = "<p>See <code class=\"language-infographic\">A</code> here</p>";

        let (result, _) = process(&Infographic::new(&renderer), html);

        assert_eq!(result.unwrap(), "<p>See <svg>A</svg> here</p>");
    }

    #[test]
    fn test_fallback_replaces_failed_block() {
        let renderer = StubRenderer::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let options = Options::default().fallback(move |node, spec, error, ctx| {
            recorded
                .lock()
                .unwrap()
                .push((node.tag().map(str::to_owned), spec.to_owned()));
            ctx.warn(format!("kept source: {error}"));
            Some(Node::element("p").with_child(Node::text(error.to_string())))
        });
        let html = format!("<h1>T</h1>{}", block("fail X"));

        let pipeline = Infographic::new(&renderer).with_options(options);
        let (result, ctx) = process(&pipeline, &html);

        assert_eq!(result.unwrap(), "<h1>T</h1><p>fail X is invalid</p>");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Some("pre".to_owned()), "fail X".to_owned())]
        );
        assert_eq!(ctx.messages.len(), 1);
        assert!(!ctx.has_fatal());
        assert_eq!(ctx.messages[0].reason, "kept source: fail X is invalid");
    }

    #[test]
    fn test_fallback_receives_deep_copy_of_failed_node() {
        let renderer = StubRenderer::default();
        let options = Options::default().fallback(|node, _, _, _| Some(node.clone()));
        let html = block("fail X");

        let pipeline = Infographic::new(&renderer).with_options(options);
        let (result, _) = process(&pipeline, &html);

        assert_eq!(result.unwrap(), html);
    }

    #[test]
    fn test_fallback_removal_closes_gap() {
        let renderer = StubRenderer::default();
        let html = format!("<p>before</p>{}{}<p>after</p>", block("fail A"), block("B"));

        let pipeline = Infographic::new(&renderer).with_options(remove_on_error());
        let (result, _) = process(&pipeline, &html);

        assert_eq!(result.unwrap(), "<p>before</p><svg>B</svg><p>after</p>");
    }

    #[test]
    fn test_removals_and_replacements_share_parent() {
        let renderer = StubRenderer::default();
        let html = format!(
            "<section>{}{}{}{}</section>",
            block("fail 1"),
            block("A"),
            block("fail 2"),
            block("B")
        );

        let pipeline = Infographic::new(&renderer).with_options(remove_on_error());
        let (result, _) = process(&pipeline, &html);

        assert_eq!(result.unwrap(), "<section><svg>A</svg><svg>B</svg></section>");
    }

    #[test]
    fn test_failure_without_fallback_aborts_untouched() {
        let renderer = StubRenderer::default().output("A", "<svg>A</svg>");
        let mut doc = Document::parse(&format!("<main>{}{}</main>", block("A"), block("fail B"))).unwrap();
        let before = doc.serialize();
        let mut ctx = ProcessingContext::for_path("docs/index.html");

        let result = tokio_test::block_on(Infographic::new(&renderer).run(&mut doc, &mut ctx));

        let Err(ProcessError::Render(error)) = result else {
            panic!("expected render error, got {result:?}");
        };
        assert_eq!(error.reason, "Failed to render infographic: fail B is invalid");
        assert_eq!(error.ancestors, vec!["#root", "main", "pre"]);
        assert!(error.fatal);
        assert_eq!(doc.serialize(), before);
        assert_eq!(renderer.specs(), vec!["A", "fail B"]);

        assert_eq!(ctx.messages.len(), 1);
        let message = &ctx.messages[0];
        assert!(message.fatal);
        assert_eq!(message.rule_id, "infographic");
        assert_eq!(message.source, "infographic");
        assert_eq!(message.url.as_deref(), Some("https://github.com/antvis/infographic"));
        assert_eq!(message.ancestors, vec!["#root", "main", "pre"]);
    }

    #[test]
    fn test_first_failure_in_order_is_escalated() {
        let renderer = StubRenderer::default()
            .delay("fail first", 20)
            .delay("fail second", 1);
        let html = format!("{}{}", block("fail first"), block("fail second"));

        let (result, ctx) = process(&Infographic::new(&renderer), &html);

        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "Failed to render infographic: fail first is invalid");
        assert_eq!(ctx.messages.len(), 1);
    }

    #[test]
    fn test_success_with_failure_removed() {
        let renderer = StubRenderer::default();
        let html = format!("{}{}", block("A"), block("fail B"));

        let pipeline = Infographic::new(&renderer).with_options(remove_on_error());
        let (result, _) = process(&pipeline, &html);

        assert_eq!(result.unwrap(), "<svg>A</svg>");
    }

    #[test]
    fn test_xml_declaration_stripped_from_output() {
        let renderer = StubRenderer::default().output(
            "A",
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"4\"/></svg>",
        );

        let (result, _) = process(&Infographic::new(&renderer), &block("A"));

        assert_eq!(
            result.unwrap(),
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"4\"></rect></svg>"
        );
    }

    #[test]
    fn test_unparseable_output_kept_as_raw_markup() {
        let renderer = StubRenderer::default().output("A", "<svg <broken");

        let (result, _) = process(&Infographic::new(&renderer), &block("A"));

        assert_eq!(
            result.unwrap(),
            "<div class=\"infographic-raw\">&lt;svg &lt;broken</div>"
        );
    }

    #[test]
    fn test_render_options_passed_to_every_call() {
        let renderer = StubRenderer::default();
        let options = Options::default()
            .height(300u32)
            .renderer_option("theme", "dark")
            .renderer_option("width", "50%");
        let html = format!("{}{}", block("A"), block("B"));

        let pipeline = Infographic::new(&renderer).with_options(options);
        let (result, _) = process(&pipeline, &html);
        result.unwrap();

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        for (_, options) in calls.iter() {
            assert_eq!(options.width, Dimension::Css("50%".to_owned()));
            assert_eq!(options.height, Dimension::Number(300.0));
            assert_eq!(options.extra.get("theme"), Some(&json!("dark")));
        }
    }

    #[test]
    fn test_custom_marker() {
        let renderer = StubRenderer::default();
        let html = "<pre><code class=\"language-chart\">A</code></pre>";

        let default = process(&Infographic::new(&renderer), html).0.unwrap();
        let custom = process(
            &Infographic::new(&renderer).with_options(Options::default().marker("chart")),
            html,
        )
        .0
        .unwrap();

        assert_eq!(default, html);
        assert_eq!(custom, "<svg>A</svg>");
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        let renderer = StubRenderer::default();

        let (result, _) = process(&Infographic::new(&renderer), "<div class=\"x\"");

        assert!(matches!(result, Err(ProcessError::Parse(_))));
    }
}
