//! Sanitization engine adapter.
//!
//! The engine is acquired lazily through an [`EngineLoader`]; [`LazyEngine`]
//! memoizes the acquisition so concurrent first-use callers share one load.
//! The production engine is [`AmmoniaEngine`], a whitelist sanitizer that
//! removes scripts, inline event handlers and dangerous URL schemes.

use std::fmt;
use std::future::Future;

use ammonia::Builder;
use tokio::sync::OnceCell;

use crate::config::LINK_REL;
use crate::error::SanitizeError;

/// Rule set applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Profile {
    /// Standard document content: structural and inline formatting markup.
    #[default]
    Html,
}

/// Markup that has passed through a sanitization engine.
///
/// Only the engine adapter and the empty short-circuit construct this type,
/// so holding one means the content is safe to inject as raw markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    /// The empty output used for absent or empty input.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub(crate) fn from_engine(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded sanitizer.
pub trait SanitizeEngine {
    /// Strip disallowed constructs from `raw` under `profile`.
    fn sanitize(
        &self,
        raw: &str,
        profile: Profile,
    ) -> impl Future<Output = Result<String, SanitizeError>>;
}

/// One-time asynchronous acquisition of a [`SanitizeEngine`].
pub trait EngineLoader {
    type Engine: SanitizeEngine;

    fn load(&self) -> impl Future<Output = Result<Self::Engine, SanitizeError>>;
}

/// Memoized engine acquisition.
///
/// The first caller runs the loader; callers arriving while the load is in
/// flight wait on the same load. A failed load is not cached, so the next
/// request tries again.
pub struct LazyEngine<L: EngineLoader> {
    loader: L,
    engine: OnceCell<L::Engine>,
}

impl<L: EngineLoader> LazyEngine<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            engine: OnceCell::new(),
        }
    }

    /// Acquire the engine, loading it on first use.
    pub async fn acquire(&self) -> Result<&L::Engine, SanitizeError> {
        self.engine
            .get_or_try_init(|| self.loader.load())
            .await
    }

    /// Whether the acquisition step has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.engine.initialized()
    }

    /// Acquire the engine and sanitize `raw` with it.
    pub async fn sanitize(
        &self,
        raw: &str,
        profile: Profile,
    ) -> Result<SanitizedHtml, SanitizeError> {
        let engine = self.acquire().await?;
        let markup = engine.sanitize(raw, profile).await?;
        Ok(SanitizedHtml::from_engine(markup))
    }
}

// =============================================================================
// Ammonia
// =============================================================================

/// Sanitizer backed by `ammonia`.
pub struct AmmoniaEngine {
    html: Builder<'static>,
}

impl AmmoniaEngine {
    pub fn new() -> Self {
        let mut html = Builder::default();
        html.strip_comments(true)
            .link_rel(Some(LINK_REL))
            .add_generic_attributes(["class", "id", "style"]);
        Self { html }
    }

    /// Synchronous clean, shared by the async trait method.
    pub fn clean(&self, raw: &str, profile: Profile) -> String {
        match profile {
            Profile::Html => self.html.clean(raw).to_string(),
        }
    }
}

impl Default for AmmoniaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SanitizeEngine for AmmoniaEngine {
    async fn sanitize(&self, raw: &str, profile: Profile) -> Result<String, SanitizeError> {
        Ok(self.clean(raw, profile))
    }
}

/// Loader for [`AmmoniaEngine`]. Building the whitelist is the only work.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaLoader;

impl EngineLoader for AmmoniaLoader {
    type Engine = AmmoniaEngine;

    async fn load(&self) -> Result<AmmoniaEngine, SanitizeError> {
        Ok(AmmoniaEngine::new())
    }
}
