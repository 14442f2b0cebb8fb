//! Identifiers attached to pipeline diagnostics.

/// Rule identifier and source name of pipeline messages.
pub const RULE_ID: &str = "infographic";

/// Documentation URL attached to fatal render errors.
pub const DOCS_URL: &str = "https://github.com/antvis/infographic";

/// Default marker name recognized on code blocks.
pub const DEFAULT_MARKER: &str = "infographic";

/// Class of the container holding raw markup that could not be parsed.
pub const RAW_MARKUP_CLASS: &str = "infographic-raw";
