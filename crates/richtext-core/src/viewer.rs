//! Viewer controller wiring the generation guard, the lazily acquired
//! engine and the render surface.
//!
//! All mutation happens on one thread at well-defined points: when content
//! is requested, and when a sanitization future completes. The future
//! returned by [`Viewer::set_content`] is `'static` so a host can hand it to
//! its local executor (`spawn_local`, a `LocalSet`, ...).

use std::cell::{Ref, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::error::SanitizeError;
use crate::generation::{GenerationGuard, GenerationToken};
use crate::sanitize::{EngineLoader, LazyEngine, Profile, SanitizedHtml};
use crate::style::{StyleMap, StyleOverrides, default_styles, resolve};
use crate::surface::{ContentPhase, RenderSurface};

/// Receives engine failures that were degraded to empty output.
pub type DiagnosticHook = Rc<dyn Fn(&SanitizeError)>;

/// How a content request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The output is now on the surface.
    Committed(SanitizedHtml),
    /// The engine failed; the surface now shows empty output.
    Degraded(SanitizeError),
    /// Superseded or unmounted before completion; nothing was written.
    Discarded,
}

struct State {
    guard: GenerationGuard,
    surface: RenderSurface,
}

/// Owner of one render surface.
pub struct Viewer<L: EngineLoader> {
    engine: Rc<LazyEngine<L>>,
    state: Rc<RefCell<State>>,
    on_error: Option<DiagnosticHook>,
}

impl<L: EngineLoader> Clone for Viewer<L> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            state: Rc::clone(&self.state),
            on_error: self.on_error.clone(),
        }
    }
}

impl<L: EngineLoader> fmt::Debug for Viewer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Viewer")
            .field("current", &state.guard.current())
            .field("surface", &state.surface)
            .finish_non_exhaustive()
    }
}

impl<L: EngineLoader + 'static> Viewer<L> {
    /// Mount a surface with the builtin styles, sharing `engine`.
    pub fn new(engine: Rc<LazyEngine<L>>) -> Self {
        Self {
            engine,
            state: Rc::new(RefCell::new(State {
                guard: GenerationGuard::new(),
                surface: RenderSurface::mount(default_styles(), None),
            })),
            on_error: None,
        }
    }

    /// Mount a surface with its own engine.
    pub fn with_loader(loader: L) -> Self {
        Self::new(Rc::new(LazyEngine::new(loader)))
    }

    /// Mount a surface and apply a preset.
    pub fn from_config(engine: Rc<LazyEngine<L>>, config: &ViewerConfig) -> Self {
        let viewer = Self::new(engine);
        viewer.set_style(config.class.clone(), &config.overrides, &config.style);
        viewer
    }

    /// Install a diagnostic hook for degraded results.
    pub fn with_diagnostics(mut self, hook: impl Fn(&SanitizeError) + 'static) -> Self {
        self.on_error = Some(Rc::new(hook));
        self
    }

    /// Re-resolve presentation. Never triggers sanitization.
    pub fn set_style(&self, class: Option<String>, typed: &StyleOverrides, freeform: &StyleMap) {
        self.apply_style(resolve(&default_styles(), typed, freeform), class);
    }

    /// Install an already resolved style set. Never triggers sanitization.
    pub fn apply_style(&self, style: StyleMap, class: Option<String>) {
        self.state.borrow_mut().surface.apply_style(style, class);
    }

    /// Request new content.
    ///
    /// Mints a generation token, making every earlier request stale. Absent
    /// or empty input commits empty output immediately without touching the
    /// engine. Otherwise the returned future sanitizes `raw` and commits the
    /// result only if no newer request (or unmount) happened meanwhile.
    pub fn set_content(&self, raw: Option<&str>) -> impl Future<Output = Outcome> + use<L> {
        let raw = raw.unwrap_or_default().to_string();

        let (token, immediate) = {
            let mut state = self.state.borrow_mut();
            let token = state.guard.mint();
            let retired = state.guard.is_retired();

            if retired {
                (None, Outcome::Discarded)
            } else if raw.is_empty() {
                state.surface.commit(SanitizedHtml::empty());
                (None, Outcome::Committed(SanitizedHtml::empty()))
            } else {
                state.surface.begin(token);
                (Some(token), Outcome::Discarded)
            }
        };

        let engine = Rc::clone(&self.engine);
        let state = Rc::clone(&self.state);
        let on_error = self.on_error.clone();

        async move {
            let Some(token) = token else {
                return immediate;
            };
            let result = engine.sanitize(&raw, Profile::Html).await;
            complete(&state, token, result, on_error.as_ref())
        }
    }

    /// Tear down the surface. In-flight requests complete but never commit.
    pub fn unmount(&self) {
        let mut state = self.state.borrow_mut();
        state.guard.retire();
        state.surface.unmount();
    }

    pub fn surface(&self) -> Ref<'_, RenderSurface> {
        Ref::map(self.state.borrow(), |state| &state.surface)
    }

    pub fn phase(&self) -> ContentPhase {
        self.state.borrow().surface.phase()
    }

    /// Currently committed output.
    pub fn content(&self) -> SanitizedHtml {
        self.state.borrow().surface.content().clone()
    }

    pub fn markup(&self) -> String {
        self.state.borrow().surface.to_markup()
    }

    pub fn engine(&self) -> &Rc<LazyEngine<L>> {
        &self.engine
    }
}

fn complete(
    state: &RefCell<State>,
    token: GenerationToken,
    result: Result<SanitizedHtml, SanitizeError>,
    on_error: Option<&DiagnosticHook>,
) -> Outcome {
    let mut guarded = state.borrow_mut();
    if !guarded.guard.is_current(token) {
        debug!(?token, "discarding stale sanitization result");
        return Outcome::Discarded;
    }

    match result {
        Ok(html) => {
            debug!(?token, len = html.as_str().len(), "committing sanitized content");
            guarded.surface.commit(html.clone());
            Outcome::Committed(html)
        }
        Err(err) => {
            warn!(?token, error = %err, "sanitization failed, showing empty content");
            guarded.surface.commit(SanitizedHtml::empty());
            // Hook may call back into the viewer
            drop(guarded);
            if let Some(hook) = on_error {
                hook(&err);
            }
            Outcome::Degraded(err)
        }
    }
}
