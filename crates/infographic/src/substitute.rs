//! Renders collected blocks and substitutes the results into the document.
//!
//! Rendering and mutation are strictly separated:
//! 1. every job is rendered concurrently on the caller's task and all
//!    outcomes are awaited
//! 2. outcomes are resolved in worklist order into planned substitutions;
//!    fallback policies run here, and the first unhandled failure aborts
//!    before anything is mutated
//! 3. the plan is applied, re-resolving each target's position at the moment
//!    it is mutated

use std::time::Instant;

use futures::future::join_all;
use infographic_render::{RenderError, Renderer};
use infographic_tree::{Document, Node, parse_fragment, strip_xml_declaration};

use crate::collector::RenderJob;
use crate::consts::RAW_MARKUP_CLASS;
use crate::context::ProcessingContext;
use crate::error::{FatalRenderError, ProcessError};
use crate::options::Options;

/// Counts of what happened to the collected blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Blocks replaced by rendered markup.
    pub rendered: usize,
    /// Failed blocks replaced by a fallback node.
    pub replaced: usize,
    /// Failed blocks removed by the fallback policy.
    pub removed: usize,
}

impl ProcessSummary {
    /// Total blocks processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rendered + self.replaced + self.removed
    }
}

/// Planned mutation for one job.
enum Substitution {
    Rendered(Node),
    Fallback(Node),
    Remove,
}

/// Render all jobs and substitute the results.
///
/// # Errors
///
/// Returns [`ProcessError::Render`] for the first failed job in worklist order
/// when no fallback policy is configured. The document is left untouched in
/// that case and a fatal [`Message`](crate::Message) is pushed to `ctx`.
pub async fn substitute<R: Renderer>(
    doc: &mut Document,
    jobs: &[RenderJob],
    renderer: &R,
    options: &Options,
    ctx: &mut ProcessingContext,
) -> Result<ProcessSummary, ProcessError> {
    let started_at = Instant::now();
    let render_options = options.render_options();

    let outcomes = join_all(jobs.iter().map(|job| renderer.render(&job.spec, &render_options))).await;

    let failures = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    tracing::info!(
        count = jobs.len(),
        failures,
        elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Rendered infographic blocks"
    );

    let mut plan = Vec::with_capacity(jobs.len());
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match resolve(doc, job, outcome, options, ctx) {
            Ok(substitution) => plan.push(substitution),
            Err(error) => {
                tracing::error!(error = %error, "Aborting: infographic failed without fallback");
                ctx.messages.push(error.to_message());
                return Err(error.into());
            }
        }
    }

    let mut summary = ProcessSummary::default();
    for (job, substitution) in jobs.iter().zip(plan) {
        let applied = match substitution {
            Substitution::Rendered(node) => {
                summary.rendered += 1;
                doc.replace(job.target, node).is_some()
            }
            Substitution::Fallback(node) => {
                summary.replaced += 1;
                doc.replace(job.target, node).is_some()
            }
            Substitution::Remove => {
                summary.removed += 1;
                doc.remove(job.target)
            }
        };
        if !applied {
            tracing::warn!(target_node = ?job.target, "Infographic block was detached before substitution");
        }
    }

    Ok(summary)
}

/// Turn one outcome into a planned substitution.
fn resolve(
    doc: &Document,
    job: &RenderJob,
    outcome: Result<String, RenderError>,
    options: &Options,
    ctx: &mut ProcessingContext,
) -> Result<Substitution, FatalRenderError> {
    let cause = match outcome {
        Ok(markup) => return Ok(Substitution::Rendered(artifact_node(&markup))),
        Err(cause) => cause,
    };

    let Some(policy) = &options.fallback else {
        return Err(FatalRenderError::new(cause, job.ancestor_tags(doc)));
    };

    tracing::warn!(target_node = ?job.target, error = %cause, "Infographic failed, applying fallback");
    let failed = doc.to_node(job.target);
    Ok(match policy(&failed, &job.spec, &cause, ctx) {
        Some(node) => Substitution::Fallback(node),
        None => Substitution::Remove,
    })
}

/// Convert rendered markup into the node that replaces a block.
///
/// Uses the first element of the parsed markup. Markup that does not parse,
/// or holds no element, is kept verbatim as text inside a `div`.
fn artifact_node(markup: &str) -> Node {
    match parse_fragment(strip_xml_declaration(markup)) {
        Ok(nodes) => {
            if let Some(node) = nodes.into_iter().find(|node| node.as_element().is_some()) {
                return node;
            }
            tracing::warn!(markup_bytes = markup.len(), "Rendered markup has no element, keeping it as text");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rendered markup failed to parse, keeping it as text");
        }
    }
    Node::element("div")
        .with_attr("class", RAW_MARKUP_CLASS)
        .with_child(Node::text(markup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_artifact_node_takes_first_element() {
        let node = artifact_node("\n<!-- generated -->\n<svg viewBox=\"0 0 1 1\"><g></g></svg>\n");
        assert_eq!(node.tag(), Some("svg"));
        assert_eq!(node.as_element().unwrap().attrs.get("viewBox"), Some("0 0 1 1"));
    }

    #[test]
    fn test_artifact_node_strips_xml_declaration() {
        let node = artifact_node("<?xml version=\"1.0\" encoding=\"UTF-8\"?><svg></svg>");
        assert_eq!(node, Node::element("svg"));
    }

    #[test]
    fn test_artifact_node_unparseable_markup_kept_as_text() {
        let markup = "<svg width=\"10\"";
        let node = artifact_node(markup);
        assert_eq!(
            node,
            Node::element("div")
                .with_attr("class", "infographic-raw")
                .with_child(Node::text(markup))
        );
    }

    #[test]
    fn test_artifact_node_text_only_markup_kept_as_text() {
        let node = artifact_node("just text");
        assert_eq!(node.tag(), Some("div"));
        assert_eq!(node.text_content(), "just text");
    }

    #[test]
    fn test_summary_total() {
        let summary = ProcessSummary {
            rendered: 2,
            replaced: 1,
            removed: 1,
        };
        assert_eq!(summary.total(), 4);
    }
}
