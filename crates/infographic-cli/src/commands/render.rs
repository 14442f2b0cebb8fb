//! `infographic render` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use infographic::{Infographic, ProcessSummary, ProcessingContext};
use infographic_config::{CliSettings, Config, OnError, RendererKind};
use infographic_render::{
    CommandRenderer, Dimension, HttpRenderer, RenderError, RenderOptions, Renderer,
};
use infographic_tree::Document;

use crate::error::CliError;
use crate::output::Output;

/// Reads from stdin / writes to stdout.
const STDIO_PATH: &str = "-";

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// HTML file to process (`-` for stdin).
    input: PathBuf,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover infographic.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render service URL (overrides config).
    #[arg(long, conflicts_with = "command")]
    url: Option<String>,

    /// Renderer program and arguments (overrides config).
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "CMD")]
    command: Option<Vec<String>>,

    /// What to do with blocks that fail to render: fail, remove, keep, message.
    #[arg(long, value_name = "POLICY")]
    on_error: Option<OnError>,

    /// Default infographic width, CSS length or pixels (overrides config).
    #[arg(long)]
    width: Option<Dimension>,

    /// Default infographic height, CSS length or pixels (overrides config).
    #[arg(long)]
    height: Option<Dimension>,

    /// Enable verbose output (show per-run timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// parsed, or a block fails with `on_error = "fail"`.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            url: self.url,
            command: self.command,
            on_error: self.on_error,
            width: self.width,
            height: self.height,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let renderer = SelectedRenderer::from_config(&config)?;

        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        output.info(&format!("Renderer: {}", renderer.describe()));

        let html = read_input(&self.input)?;
        let mut doc = Document::parse(&html)?;
        let mut ctx = if is_stdio(&self.input) {
            ProcessingContext::new()
        } else {
            ProcessingContext::for_path(&self.input)
        };

        let pipeline = Infographic::new(renderer).with_options(config.options());
        let result = pipeline.run(&mut doc, &mut ctx).await;

        for message in ctx.messages.iter().filter(|message| !message.fatal) {
            output.warning(&format!("Warning: {message}"));
        }
        let summary = result?;

        write_output(self.output.as_deref(), &doc.serialize())?;
        output.success(&summary_line(&summary));
        Ok(())
    }
}

/// Renderer chosen by the `[renderer]` section.
enum SelectedRenderer {
    Http(HttpRenderer),
    Command(CommandRenderer),
}

impl SelectedRenderer {
    fn from_config(config: &Config) -> Result<Self, CliError> {
        let timeout = config.renderer.timeout();
        Ok(match config.renderer.kind()? {
            RendererKind::Http { url } => Self::Http(HttpRenderer::new(url).timeout(timeout)),
            RendererKind::Command { program, args } => {
                Self::Command(CommandRenderer::new(program).args(args).timeout(timeout))
            }
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Http(renderer) => renderer.endpoint().to_owned(),
            Self::Command(renderer) => renderer.command_line(),
        }
    }
}

impl Renderer for SelectedRenderer {
    async fn render(&self, spec: &str, options: &RenderOptions) -> Result<String, RenderError> {
        match self {
            Self::Http(renderer) => renderer.render(spec, options).await,
            Self::Command(renderer) => renderer.render(spec, options).await,
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if is_stdio(path) {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        return Ok(html);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn write_output(path: Option<&Path>, html: &str) -> Result<(), CliError> {
    match path {
        Some(path) if !is_stdio(path) => std::fs::write(path, html)?,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn summary_line(summary: &ProcessSummary) -> String {
    if summary.total() == 0 {
        return "No infographic blocks found".to_owned();
    }
    let mut line = format!(
        "Rendered {} of {} infographic blocks",
        summary.rendered,
        summary.total()
    );
    if summary.replaced > 0 {
        line.push_str(&format!(", {} replaced by fallback", summary.replaced));
    }
    if summary.removed > 0 {
        line.push_str(&format!(", {} removed", summary.removed));
    }
    line
}
