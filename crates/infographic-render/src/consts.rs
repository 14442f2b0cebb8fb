//! Internal constants for renderers.

use std::time::Duration;

/// Default time limit for a single render (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable carrying JSON render options to command renderers.
pub const OPTIONS_ENV: &str = "INFOGRAPHIC_OPTIONS";
