//! Three-layer style resolution.
//!
//! Layers are applied per property, later wins:
//! 1. builtin defaults ([`default_styles`])
//! 2. typed convenience overrides ([`StyleOverrides`]), only those supplied
//! 3. freeform overrides ([`StyleMap`]), which may set any property

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::config::{DEFAULT_STYLES, UNITLESS_PROPERTIES};
use crate::error::StyleError;

/// A single style value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Used verbatim.
    Text(String),
    /// Rendered in pixels unless the property is unitless.
    Number(f64),
}

impl StyleValue {
    /// Render the value for `property` (kebab-case).
    ///
    /// Non-finite numbers have no CSS form and render as `None`.
    pub fn render(&self, property: &str) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(n) if !n.is_finite() => None,
            Self::Number(n) if *n == 0.0 || UNITLESS_PROPERTIES.contains(&property) => {
                Some(n.to_string())
            }
            Self::Number(n) => Some(format!("{}px", n)),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

/// Overflow behavior of the surface container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Scroll => "scroll",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Overflow {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            "scroll" => Ok(Self::Scroll),
            "auto" => Ok(Self::Auto),
            other => Err(StyleError::UnknownOverflow(other.to_string())),
        }
    }
}

impl From<Overflow> for StyleValue {
    fn from(value: Overflow) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

// =============================================================================
// StyleMap
// =============================================================================

/// Ordered mapping from CSS property to rendered value.
///
/// Keys are normalized to kebab-case, so `maxHeight` and `max-height` name
/// the same property. Overwriting a property keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `property`, replacing any existing value in place.
    ///
    /// A value with no CSS form is ignored, leaving the property as it was.
    pub fn set(&mut self, property: &str, value: impl Into<StyleValue>) {
        let key = normalize_property(property);
        let Some(rendered) = value.into().render(&key) else {
            return;
        };
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = rendered,
            None => self.entries.push((key, rendered)),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, property: &str, value: impl Into<StyleValue>) -> Self {
        self.set(property, value);
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let key = normalize_property(property);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Apply every property of `layer` on top of this map.
    pub fn overlay(&mut self, layer: &StyleMap) {
        for (key, value) in &layer.entries {
            match self.entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, v)) => v.clone_from(value),
                None => self.entries.push((key.clone(), value.clone())),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as an inline `style` attribute value.
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: AsRef<str>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (k, v) in iter {
            style.set(k.as_ref(), v);
        }
        style
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StyleMapVisitor;

        impl<'de> Visitor<'de> for StyleMapVisitor {
            type Value = StyleMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of style properties")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StyleMap, A::Error> {
                let mut style = StyleMap::new();
                while let Some((key, value)) = map.next_entry::<String, StyleValue>()? {
                    style.set(&key, value);
                }
                Ok(style)
            }
        }

        deserializer.deserialize_map(StyleMapVisitor)
    }
}

/// Convert a camelCase property name to CSS kebab-case.
///
/// Custom properties (`--name`) are returned unchanged.
fn normalize_property(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        return property.to_string();
    }

    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// Layers
// =============================================================================

/// Typed convenience overrides. `None` inherits from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleOverrides {
    // Typography
    pub font_size: Option<StyleValue>,
    pub line_height: Option<StyleValue>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    // Container
    pub border: Option<String>,
    pub border_radius: Option<StyleValue>,
    pub padding: Option<StyleValue>,
    pub max_height: Option<StyleValue>,
    pub overflow: Option<Overflow>,
    pub background_color: Option<String>,
}

impl StyleOverrides {
    /// Only the supplied overrides, as a layer.
    pub fn to_layer(&self) -> StyleMap {
        let mut layer = StyleMap::new();
        let mut put = |property: &str, value: Option<StyleValue>| {
            if let Some(value) = value {
                layer.set(property, value);
            }
        };

        put("font-size", self.font_size.clone());
        put("line-height", self.line_height.clone());
        put("font-family", self.font_family.clone().map(StyleValue::from));
        put("color", self.color.clone().map(StyleValue::from));
        put("border", self.border.clone().map(StyleValue::from));
        put("border-radius", self.border_radius.clone());
        put("padding", self.padding.clone());
        put("max-height", self.max_height.clone());
        put("overflow", self.overflow.map(StyleValue::from));
        put("background-color", self.background_color.clone().map(StyleValue::from));

        layer
    }
}

/// The builtin baseline layer.
pub fn default_styles() -> StyleMap {
    DEFAULT_STYLES.iter().copied().collect()
}

/// Merge the three layers into one flat style set.
pub fn resolve(defaults: &StyleMap, typed: &StyleOverrides, freeform: &StyleMap) -> StyleMap {
    let mut resolved = defaults.clone();
    resolved.overlay(&typed.to_layer());
    resolved.overlay(freeform);
    resolved
}
