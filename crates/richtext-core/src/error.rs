//! Error types for the viewer pipeline.
//!
//! - [`SanitizeError`] - Engine acquisition and sanitization-call failures
//! - [`StyleError`] - Caller-facing style value validation
//! - [`ConfigError`] - Viewer preset parsing

use thiserror::Error;

/// Failures of the sanitization engine.
///
/// Never propagated to the rendering tree; the viewer degrades these to
/// empty output and reports them through its diagnostic hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// The engine could not be acquired.
    #[error("sanitization engine unavailable: {0}")]
    EngineUnavailable(String),
    /// The engine rejected the input.
    #[error("sanitization rejected input: {0}")]
    Rejected(String),
}

/// Invalid caller-supplied style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// Overflow value outside `visible`, `hidden`, `scroll`, `auto`.
    #[error("unknown overflow value '{0}' (expected visible, hidden, scroll or auto)")]
    UnknownOverflow(String),
}

/// Viewer preset loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML syntax or schema error.
    #[error("invalid viewer config: {0}")]
    Parse(#[from] toml::de::Error),
}
