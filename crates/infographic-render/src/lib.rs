//! Renderer collaborators for infographic blocks.
//!
//! A renderer takes the raw text of an infographic specification and returns
//! SVG markup, or fails with a [`RenderError`]. The pipeline treats it as a
//! black box.
//!
//! # Architecture
//!
//! - [`Renderer`]: the async seam the pipeline renders through
//! - [`RenderOptions`] / [`Dimension`]: width, height and pass-through options
//! - [`HttpRenderer`]: JSON POST to a render service via `ureq`
//! - [`CommandRenderer`]: SSR program with spec on stdin, SVG on stdout

mod command;
mod consts;
mod error;
mod http;
mod options;
mod renderer;

pub use command::CommandRenderer;
pub use consts::{DEFAULT_TIMEOUT, OPTIONS_ENV};
pub use error::RenderError;
pub use http::HttpRenderer;
pub use options::{Dimension, RenderOptions};
pub use renderer::Renderer;
