//! Render service client.
//!
//! Posts `{"spec": ..., "options": {...}}` as JSON to a render endpoint and
//! expects SVG markup back. Requests are blocking `ureq` calls moved onto the
//! tokio blocking pool, so concurrent renders overlap on the wire.

use std::time::{Duration, Instant};

use serde::Serialize;
use ureq::Agent;

use crate::consts::DEFAULT_TIMEOUT;
use crate::error::RenderError;
use crate::options::RenderOptions;
use crate::renderer::Renderer;

/// Request body sent to the render service.
#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    spec: &'a str,
    options: &'a RenderOptions,
}

/// Renderer backed by an HTTP render service.
///
/// Requires a tokio runtime: each call runs on `spawn_blocking`.
///
/// # Example
///
/// ```ignore
/// use infographic_render::HttpRenderer;
///
/// let renderer = HttpRenderer::new("http://localhost:3000/render")
///     .timeout(std::time::Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    endpoint: String,
    agent: Agent,
}

impl HttpRenderer {
    /// Create a renderer posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the per-request timeout (default: 30 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, spec: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let started_at = Instant::now();
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let body = serde_json::to_vec(&RenderRequest { spec, options })
            .map_err(|e| RenderError::InvalidOutput(format!("unserializable options: {e}")))?;

        let result = tokio::task::spawn_blocking(move || send_render_request(&agent, &endpoint, &body))
            .await
            .map_err(|e| RenderError::Request(format!("render task failed: {e}")))?;

        let elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(svg) => tracing::debug!(
                endpoint = %self.endpoint,
                elapsed_ms,
                svg_bytes = svg.len(),
                "Infographic rendered via HTTP"
            ),
            Err(e) => tracing::warn!(
                endpoint = %self.endpoint,
                elapsed_ms,
                error = %e,
                "HTTP render failed"
            ),
        }
        result
    }
}

/// Create an HTTP agent that reports error statuses as responses.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Send one render request and return the response body as text.
fn send_render_request(agent: &Agent, endpoint: &str, body: &[u8]) -> Result<String, RenderError> {
    let response = agent
        .post(endpoint)
        .header("Content-Type", "application/json")
        .header("Accept", "image/svg+xml")
        .send(body)
        .map_err(|e| RenderError::Request(e.to_string()))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(RenderError::Http {
            status,
            body: error_body,
        });
    }

    let data = body
        .read_to_vec()
        .map_err(|e| RenderError::Request(e.to_string()))?;
    String::from_utf8(data).map_err(|e| RenderError::InvalidOutput(format!("invalid UTF-8: {e}")))
}
