//! CLI error types.

use infographic::ProcessError;
use infographic_config::ConfigError;
use infographic_tree::ParseError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse input: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Process(#[from] ProcessError),
}
