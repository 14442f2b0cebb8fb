//! Render failure causes.

use std::time::Duration;

/// Why a single infographic failed to render.
///
/// Captured per job as data; one failure never aborts sibling renders.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The render service could not be reached or the request broke off.
    #[error("render request failed: {0}")]
    Request(String),

    /// The render service answered with an error status.
    #[error("render service returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (usually the renderer's own error message).
        body: String,
    },

    /// The renderer program could not be started.
    #[error("failed to start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O with a running renderer program failed.
    #[error("renderer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer program exited unsuccessfully.
    #[error("renderer exited with {}: {stderr}", .exit_code.map_or_else(|| "signal".to_owned(), |code| format!("code {code}")))]
    Command {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The renderer did not finish within its time limit.
    #[error("renderer timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The renderer produced output that is not usable markup text.
    #[error("renderer produced invalid output: {0}")]
    InvalidOutput(String),

    /// The renderer rejected the specification.
    #[error("{0}")]
    Rejected(String),
}
