//! The renderer seam.

use std::future::Future;
use std::sync::Arc;

use crate::error::RenderError;
use crate::options::RenderOptions;

/// Turns an infographic specification into SVG markup.
///
/// Implementations own their transport, concurrency limits and timeouts. The
/// pipeline calls `render` once per block, polls all calls together and never
/// retries.
pub trait Renderer {
    /// Render one specification.
    fn render(
        &self,
        spec: &str,
        options: &RenderOptions,
    ) -> impl Future<Output = Result<String, RenderError>>;
}

impl<R: Renderer> Renderer for &R {
    fn render(
        &self,
        spec: &str,
        options: &RenderOptions,
    ) -> impl Future<Output = Result<String, RenderError>> {
        (**self).render(spec, options)
    }
}

impl<R: Renderer> Renderer for Arc<R> {
    fn render(
        &self,
        spec: &str,
        options: &RenderOptions,
    ) -> impl Future<Output = Result<String, RenderError>> {
        (**self).render(spec, options)
    }
}
