//! Options handed to a renderer for every infographic.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Width or height of a rendered infographic.
///
/// Accepts either a CSS length (`"100%"`, `"auto"`, `"640px"`) or a plain
/// number of pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Css(String),
}

impl Dimension {
    /// Default width: `100%`.
    #[must_use]
    pub fn full_width() -> Self {
        Self::Css("100%".to_owned())
    }

    /// Default height: `auto`.
    #[must_use]
    pub fn auto() -> Self {
        Self::Css("auto".to_owned())
    }

    /// Interpret a JSON value as a dimension (strings and numbers only).
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(css) => Some(Self::Css(css.clone())),
            Value::Number(number) => number.as_f64().map(Self::Number),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(px) => write!(f, "{px}"),
            Self::Css(css) => f.write_str(css),
        }
    }
}

/// Plain numbers become pixels, anything else is kept as a CSS length.
impl FromStr for Dimension {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<f64>()
            .ok()
            .filter(|px| px.is_finite())
            .map_or_else(|| Self::Css(s.to_owned()), Self::Number))
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Self::Css(value.to_owned())
    }
}

impl From<String> for Dimension {
    fn from(value: String) -> Self {
        Self::Css(value)
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Dimension {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Options for a single render call.
///
/// Serializes flat: `{"width": ..., "height": ..., <extra keys>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOptions {
    pub width: Dimension,
    pub height: Dimension,
    /// Renderer-specific options passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: Dimension::full_width(),
            height: Dimension::auto(),
            extra: Map::new(),
        }
    }
}

impl RenderOptions {
    /// Build options from defaults plus an override map.
    ///
    /// Overrides are applied last, so `width`/`height` keys holding a string or
    /// a number replace the given defaults; other values for those keys are
    /// ignored. Every other key lands in `extra`.
    #[must_use]
    pub fn merged(width: Dimension, height: Dimension, overrides: &Map<String, Value>) -> Self {
        let mut options = Self {
            width,
            height,
            extra: Map::new(),
        };
        for (key, value) in overrides {
            let slot = match key.as_str() {
                "width" => &mut options.width,
                "height" => &mut options.height,
                _ => {
                    options.extra.insert(key.clone(), value.clone());
                    continue;
                }
            };
            match Dimension::from_json(value) {
                Some(dimension) => *slot = dimension,
                None => tracing::warn!(key = %key, "Ignoring non-dimension size override"),
            }
        }
        options
    }
}
