//! End-to-end tests of the sanitize-then-commit pipeline.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use richtext_core::{
    AmmoniaEngine, AmmoniaLoader, ContentPhase, EngineLoader, LazyEngine, Outcome, Profile,
    SanitizeEngine, SanitizeError, StyleMap, StyleOverrides, Viewer,
};
use tokio::sync::oneshot;
use tokio::task::{LocalSet, spawn_local, yield_now};

// =============================================================================
// Test engines
// =============================================================================

type Gates = Rc<RefCell<HashMap<String, oneshot::Receiver<()>>>>;

/// Ammonia engine whose calls block until the input's gate is released.
struct GatedLoader {
    gates: Gates,
}

struct GatedEngine {
    inner: AmmoniaEngine,
    gates: Gates,
}

impl EngineLoader for GatedLoader {
    type Engine = GatedEngine;

    async fn load(&self) -> Result<GatedEngine, SanitizeError> {
        Ok(GatedEngine {
            inner: AmmoniaEngine::new(),
            gates: Rc::clone(&self.gates),
        })
    }
}

impl SanitizeEngine for GatedEngine {
    async fn sanitize(&self, raw: &str, profile: Profile) -> Result<String, SanitizeError> {
        let gate = self.gates.borrow_mut().remove(raw);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.inner.clean(raw, profile))
    }
}

/// Loader that fails to acquire, counting attempts.
struct UnavailableLoader {
    attempts: Rc<Cell<usize>>,
}

impl EngineLoader for UnavailableLoader {
    type Engine = AmmoniaEngine;

    async fn load(&self) -> Result<AmmoniaEngine, SanitizeError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(SanitizeError::EngineUnavailable("module failed to load".to_string()))
    }
}

/// Engine that rejects every input.
struct RejectingLoader;

struct RejectingEngine;

impl EngineLoader for RejectingLoader {
    type Engine = RejectingEngine;

    async fn load(&self) -> Result<RejectingEngine, SanitizeError> {
        Ok(RejectingEngine)
    }
}

impl SanitizeEngine for RejectingEngine {
    async fn sanitize(&self, raw: &str, _profile: Profile) -> Result<String, SanitizeError> {
        yield_now().await;
        Err(SanitizeError::Rejected(format!("{} bytes", raw.len())))
    }
}

async fn committed(viewer: &Viewer<AmmoniaLoader>, raw: &str) -> String {
    match viewer.set_content(Some(raw)).await {
        Outcome::Committed(html) => html.into_string(),
        other => panic!("expected commit, got {:?}", other),
    }
}

// =============================================================================
// Sanitization
// =============================================================================

#[tokio::test]
async fn test_formatting_preserved() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    let html = committed(&viewer, "<p>Hello <strong>world</strong></p>").await;

    assert!(html.contains("<strong>world</strong>"));
    assert!(viewer.markup().contains("<p>Hello <strong>world</strong></p>"));
}

#[tokio::test]
async fn test_script_removed() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    let html = committed(&viewer, "<b>Hi</b><script>alert(1)</script>").await;

    assert_eq!(html, "<b>Hi</b>");
    assert!(!viewer.markup().contains("alert("));
}

#[tokio::test]
async fn test_event_handler_removed_text_kept() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    let html = committed(&viewer, r#"<div onclick="alert(1)">Click me</div>"#).await;

    assert_eq!(html, "<div>Click me</div>");
}

#[tokio::test]
async fn test_multiline_article() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    let html = committed(
        &viewer,
        r#"
        <article>
          <h2>Article Title</h2>
          <p>Paragraph 1</p>
          <p>Paragraph 2</p>
        </article>
        "#,
    )
    .await;

    assert!(html.contains("<h2>Article Title</h2>"));
    assert!(html.contains("<p>Paragraph 2</p>"));
}

#[tokio::test]
async fn test_committed_output_is_fixed_point() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    let once = committed(
        &viewer,
        r##"<h3>T</h3><a href="#" onmouseover="x()">link</a><img src="a.png" onerror="y()">"##,
    )
    .await;
    let twice = committed(&viewer, &once).await;

    assert_eq!(once, twice);
}

// =============================================================================
// Staleness
// =============================================================================

#[tokio::test]
async fn test_out_of_order_completion_keeps_newest() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (release_first, first_gate) = oneshot::channel();
            let (release_second, second_gate) = oneshot::channel();
            let gates: Gates = Rc::default();
            gates.borrow_mut().insert("<p>First</p>".to_string(), first_gate);
            gates.borrow_mut().insert("<p>Second</p>".to_string(), second_gate);

            let viewer = Viewer::with_loader(GatedLoader { gates });
            let first = spawn_local(viewer.set_content(Some("<p>First</p>")));
            let second = spawn_local(viewer.set_content(Some("<p>Second</p>")));
            yield_now().await;
            assert!(matches!(viewer.phase(), ContentPhase::Sanitizing(_)));

            release_second.send(()).unwrap();
            let outcome = second.await.unwrap();
            assert!(matches!(outcome, Outcome::Committed(_)));
            assert_eq!(viewer.content().as_str(), "<p>Second</p>");

            // The slow, superseded result lands afterwards and is dropped
            release_first.send(()).unwrap();
            assert_eq!(first.await.unwrap(), Outcome::Discarded);
            assert_eq!(viewer.content().as_str(), "<p>Second</p>");
            assert_eq!(viewer.phase(), ContentPhase::Committed);
        })
        .await;
}

#[tokio::test]
async fn test_previous_output_visible_while_pending() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (release, gate) = oneshot::channel();
            let gates: Gates = Rc::default();
            gates.borrow_mut().insert("<p>Next</p>".to_string(), gate);

            let viewer = Viewer::with_loader(GatedLoader { gates });
            viewer.set_content(Some("<p>Current</p>")).await;

            let next = spawn_local(viewer.set_content(Some("<p>Next</p>")));
            yield_now().await;
            assert_eq!(viewer.content().as_str(), "<p>Current</p>");

            release.send(()).unwrap();
            next.await.unwrap();
            assert_eq!(viewer.content().as_str(), "<p>Next</p>");
        })
        .await;
}

#[tokio::test]
async fn test_unmount_while_pending() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (release, gate) = oneshot::channel();
            let gates: Gates = Rc::default();
            gates.borrow_mut().insert("<p>Late</p>".to_string(), gate);

            let viewer = Viewer::with_loader(GatedLoader { gates });
            let pending = spawn_local(viewer.set_content(Some("<p>Late</p>")));
            yield_now().await;

            viewer.unmount();
            release.send(()).unwrap();

            assert_eq!(pending.await.unwrap(), Outcome::Discarded);
            assert!(viewer.content().is_empty());
            assert!(!viewer.surface().is_mounted());
        })
        .await;
}

#[tokio::test]
async fn test_engine_shared_between_viewers() {
    let attempts = Rc::new(Cell::new(0));
    let engine = Rc::new(LazyEngine::new(UnavailableLoader { attempts: Rc::clone(&attempts) }));
    let a = Viewer::new(Rc::clone(&engine));
    let b = Viewer::new(Rc::clone(&engine));

    a.set_content(Some("<p>a</p>")).await;
    b.set_content(Some("<p>b</p>")).await;
    assert_eq!(attempts.get(), 2);

    let engine = Rc::new(LazyEngine::new(AmmoniaLoader));
    let a = Viewer::new(Rc::clone(&engine));
    let b = Viewer::new(Rc::clone(&engine));
    a.set_content(Some("<p>a</p>")).await;
    assert!(b.engine().is_loaded());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_acquisition_failure_degrades_to_empty() {
    let attempts = Rc::new(Cell::new(0));
    let reported = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reported);

    let viewer = Viewer::with_loader(UnavailableLoader { attempts: Rc::clone(&attempts) })
        .with_diagnostics(move |err| sink.borrow_mut().push(err.clone()));

    let outcome = viewer.set_content(Some("<p>x</p>")).await;
    assert!(matches!(outcome, Outcome::Degraded(SanitizeError::EngineUnavailable(_))));
    assert!(viewer.content().is_empty());
    assert_eq!(viewer.phase(), ContentPhase::Idle);
    assert_eq!(reported.borrow().len(), 1);

    // Re-supplying the same value is the retry path
    viewer.set_content(Some("<p>x</p>")).await;
    assert_eq!(attempts.get(), 2);
    assert_eq!(reported.borrow().len(), 2);
}

#[tokio::test]
async fn test_rejection_replaces_previous_output() {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let viewer = Viewer::with_loader(RejectingLoader)
        .with_diagnostics(move |_| counter.set(counter.get() + 1));

    let outcome = viewer.set_content(Some("<p>bad</p>")).await;
    assert_eq!(outcome, Outcome::Degraded(SanitizeError::Rejected("10 bytes".to_string())));
    assert!(!viewer.markup().contains("bad"));
    assert_eq!(hits.get(), 1);
}

#[tokio::test]
async fn test_stale_failure_is_silent() {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let viewer = Viewer::with_loader(RejectingLoader)
        .with_diagnostics(move |_| counter.set(counter.get() + 1));

    let stale = viewer.set_content(Some("<p>old</p>"));
    viewer.set_content(None).await;

    assert_eq!(stale.await, Outcome::Discarded);
    assert_eq!(hits.get(), 0);
}

// =============================================================================
// Styles
// =============================================================================

#[tokio::test]
async fn test_freeform_max_height_on_surface() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    viewer.set_style(
        Some("custom-class".to_string()),
        &StyleOverrides::default(),
        &StyleMap::new().with("maxHeight", "200px"),
    );
    viewer.set_content(Some("<p>Test</p>")).await;

    let markup = viewer.markup();
    assert!(markup.starts_with(r#"<div class="custom-class" style=""#));
    assert!(markup.contains("max-height: 200px;"));
    assert!(markup.contains("font-size: 16px;"));
    assert!(markup.ends_with("<p>Test</p></div>"));
}

#[tokio::test]
async fn test_style_precedence_on_surface() {
    let viewer = Viewer::with_loader(AmmoniaLoader);
    viewer.set_style(
        None,
        &StyleOverrides {
            font_size: Some("20px".into()),
            line_height: Some(1.8.into()),
            ..Default::default()
        },
        &StyleMap::new().with("fontWeight", "bold").with("lineHeight", "2"),
    );

    let surface = viewer.surface();
    assert_eq!(surface.style().get("font-size"), Some("20px"));
    assert_eq!(surface.style().get("line-height"), Some("2"));
    assert_eq!(surface.style().get("font-weight"), Some("bold"));
    assert_eq!(surface.style().get("border-radius"), Some("8px"));
}
