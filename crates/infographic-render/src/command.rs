//! Renderer that shells out to a server-side rendering program.
//!
//! The specification is written to the program's stdin, render options are
//! passed as JSON in [`OPTIONS_ENV`], and SVG markup is read from stdout.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::consts::{DEFAULT_TIMEOUT, OPTIONS_ENV};
use crate::error::RenderError;
use crate::options::RenderOptions;
use crate::renderer::Renderer;

/// Renderer backed by an external program (for example a Node SSR script).
///
/// # Example
///
/// ```ignore
/// use infographic_render::CommandRenderer;
///
/// let renderer = CommandRenderer::new("node").args(["scripts/ssr.mjs"]);
/// ```
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    /// Create a renderer running `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append arguments passed to the program.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the per-render time limit (default: 30 seconds).
    ///
    /// A program still running at the limit is killed and the render fails
    /// with [`RenderError::Timeout`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program and arguments joined by spaces, for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, spec: &str, options_json: String) -> Result<String, RenderError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(OPTIONS_ENV, options_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(spec.as_bytes()).await {
                Ok(()) => {}
                // The program may exit without reading its input; its exit
                // status carries the real outcome.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(RenderError::Io(e)),
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RenderError::Command {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| RenderError::InvalidOutput(format!("invalid UTF-8: {e}")))
    }
}

impl Renderer for CommandRenderer {
    async fn render(&self, spec: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let started_at = Instant::now();
        let options_json = serde_json::to_string(options)
            .map_err(|e| RenderError::InvalidOutput(format!("unserializable options: {e}")))?;

        let result = match tokio::time::timeout(self.timeout, self.run(spec, options_json)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        };

        let elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(svg) => tracing::debug!(
                program = %self.program,
                elapsed_ms,
                svg_bytes = svg.len(),
                "Infographic rendered via command"
            ),
            Err(e) => tracing::warn!(
                program = %self.program,
                elapsed_ms,
                error = %e,
                "Command render failed"
            ),
        }
        result
    }
}
