//! Collects infographic blocks into an ordered worklist.
//!
//! One pre-order walk over a read-only document. For every element the
//! [`Matcher`] accepts, the unit of replacement is resolved:
//! - inside a `pre` whose other children are all whitespace-only text, the
//!   `pre` is replaced
//! - inside a `pre` with any other content, the block is left alone
//! - anywhere else, the matched element itself is replaced
//!
//! The subtree of a resolved unit is not visited again, so a marked `pre`
//! wrapping a marked `code` produces a single job.

use infographic_tree::{Document, NodeId, NodeKind};

use crate::matcher::{BLOCK_CONTAINER_TAG, Matcher};

/// One block to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Specification text, whitespace preserved.
    pub spec: String,
    /// Node replaced by the rendered artifact.
    pub target: NodeId,
    /// Parent of `target` at collection time.
    pub parent: NodeId,
    /// Index of `target` within `parent` at collection time.
    ///
    /// Informational only; substitution re-resolves the position.
    pub index: usize,
    /// Ancestors of `target`, from the root down to `parent`.
    pub ancestors: Vec<NodeId>,
}

impl RenderJob {
    /// Tag names of the ancestors plus the target itself (`#root` for the root).
    #[must_use]
    pub fn ancestor_tags(&self, doc: &Document) -> Vec<String> {
        self.ancestors
            .iter()
            .chain(std::iter::once(&self.target))
            .map(|&id| match doc.kind(id) {
                NodeKind::Root => "#root".to_owned(),
                NodeKind::Element(data) => data.tag.clone(),
                NodeKind::Text(_) => "#text".to_owned(),
                NodeKind::Comment(_) => "#comment".to_owned(),
                NodeKind::Doctype(_) => "#doctype".to_owned(),
            })
            .collect()
    }
}

/// Build the worklist of render jobs in document order.
///
/// Never fails and never mutates the document. Blocks with a blank
/// specification are skipped.
#[must_use]
pub fn collect(doc: &Document, matcher: &Matcher) -> Vec<RenderJob> {
    let mut jobs = Vec::new();
    let mut stack = vec![doc.root()];

    while let Some(id) = stack.pop() {
        if !matcher.is_candidate(doc, id) {
            stack.extend(doc.children(id).iter().rev().copied());
            continue;
        }

        let Some(target) = unit_of_replacement(doc, id) else {
            tracing::debug!(?id, "Skipping infographic block sharing its container");
            continue;
        };

        let spec = doc.text_content(target);
        if spec.trim().is_empty() {
            tracing::debug!(?target, "Skipping empty infographic block");
            continue;
        }

        let (Some(parent), Some(index)) = (doc.parent(target), doc.index_in_parent(target)) else {
            continue;
        };

        tracing::debug!(?target, index = jobs.len(), spec_bytes = spec.len(), "Collected infographic block");
        jobs.push(RenderJob {
            spec,
            target,
            parent,
            index,
            ancestors: doc.ancestors(target),
        });
    }

    jobs
}

/// Resolve which node a matched element is replaced through.
///
/// Returns `None` when the element sits in a block container that also holds
/// other content.
fn unit_of_replacement(doc: &Document, matched: NodeId) -> Option<NodeId> {
    let parent = doc.parent(matched)?;
    let in_container = doc
        .element(parent)
        .is_some_and(|element| element.is(BLOCK_CONTAINER_TAG));
    if !in_container {
        return Some(matched);
    }

    doc.children(parent)
        .iter()
        .all(|&child| child == matched || doc.is_whitespace_text(child))
        .then_some(parent)
}
