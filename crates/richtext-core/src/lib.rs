//! Headless sanitize-then-commit pipeline for rendering untrusted HTML.
//!
//! This crate provides:
//! - [`GenerationGuard`] - Staleness guard for out-of-order async results
//! - [`LazyEngine`], [`AmmoniaEngine`] - Lazily acquired sanitization engine
//! - [`resolve`], [`StyleMap`], [`StyleOverrides`] - Three-layer style merge
//! - [`RenderSurface`] - Committed content, styles and class of the mount point
//! - [`Viewer`] - Wiring of the above into a single-owner controller
//! - [`ViewerConfig`] - TOML viewer presets

pub mod config;
pub mod error;
mod generation;
mod sanitize;
mod style;
mod surface;
mod viewer;

pub use config::ViewerConfig;
pub use error::{ConfigError, SanitizeError, StyleError};
pub use generation::{GenerationGuard, GenerationToken};
pub use sanitize::{
    AmmoniaEngine, AmmoniaLoader, EngineLoader, LazyEngine, Profile, SanitizeEngine,
    SanitizedHtml,
};
pub use style::{Overflow, StyleMap, StyleOverrides, StyleValue, default_styles, resolve};
pub use surface::{ContentPhase, RenderSurface};
pub use viewer::{DiagnosticHook, Outcome, Viewer};
