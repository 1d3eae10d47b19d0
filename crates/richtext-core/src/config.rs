//! Viewer configuration.
//!
//! Centralizes the builtin style baseline and sanitizer settings, and loads
//! viewer presets from TOML.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::style::{StyleMap, StyleOverrides};

// =============================================================================
// Builtin Style Layer
// =============================================================================

/// Baseline typography and container presentation, in application order.
pub const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("font-size", "16px"),
    ("line-height", "1.6"),
    (
        "font-family",
        r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif"#,
    ),
    ("color", "#333"),
    ("border", "1px solid #e5e7eb"),
    ("border-radius", "8px"),
    ("padding", "16px"),
    ("background-color", "#ffffff"),
];

/// Properties rendered without a `px` suffix when given as numbers.
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "line-height",
    "font-weight",
    "opacity",
    "z-index",
    "flex-grow",
    "flex-shrink",
    "order",
    "zoom",
];

// =============================================================================
// Sanitizer
// =============================================================================

/// `rel` enforced on every sanitized link.
pub const LINK_REL: &str = "noopener noreferrer";

// =============================================================================
// Presets
// =============================================================================

/// A viewer preset: class token plus the two caller style layers.
///
/// ```toml
/// class = "article"
///
/// [overrides]
/// font-size = 18
/// overflow = "auto"
///
/// [style]
/// maxHeight = "200px"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Class/identity token passed through to the surface.
    pub class: Option<String>,
    /// Typed convenience layer.
    #[serde(default)]
    pub overrides: StyleOverrides,
    /// Freeform layer, applied last.
    #[serde(default)]
    pub style: StyleMap,
}

impl ViewerConfig {
    /// Parse a preset from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
