//! Rich text viewer component.
//!
//! Content changes go through the core [`Viewer`]: each `html` change mints
//! a generation token and sanitizes on the local executor, and only the
//! newest result reaches the DOM. Style props are resolved separately, pushed
//! to the core surface, and never trigger sanitization.

use std::rc::Rc;

use leptos::prelude::*;
use richtext_core::{
    AmmoniaLoader, LazyEngine, Outcome, Overflow, SanitizeError, StyleMap, StyleOverrides,
    StyleValue, Viewer, default_styles, resolve,
};
use wasm_bindgen_futures::spawn_local;

thread_local! {
    static ENGINE: Rc<LazyEngine<AmmoniaLoader>> = Rc::new(LazyEngine::new(AmmoniaLoader));
}

/// Sanitizer shared by all viewers on this thread, loaded on first use.
pub fn shared_engine() -> Rc<LazyEngine<AmmoniaLoader>> {
    ENGINE.with(Rc::clone)
}

fn warn_console(err: &SanitizeError) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("RichTextViewer: {}", err).into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = err;
}

/// Renders sanitized `html` inside a styled container.
///
/// # Props
/// - `html`: Raw markup. Absent or empty renders an empty container
/// - `class`: Class token passed through to the container
/// - `style`: Freeform style overrides, applied last (keys may be camelCase)
/// - typography: `font_size`, `line_height`, `font_family`, `color`
/// - container: `border`, `border_radius`, `padding`, `max_height`,
///   `overflow`, `background_color`
/// - `on_error`: Receives engine failures; defaults to a console warning.
///   Failures render as empty content.
#[component]
pub fn RichTextViewer(
    #[prop(into, optional)] html: MaybeProp<String>,
    #[prop(into, optional)] class: MaybeProp<String>,
    #[prop(into, optional)] style: MaybeProp<StyleMap>,
    // Typography
    #[prop(into, optional)] font_size: MaybeProp<StyleValue>,
    #[prop(into, optional)] line_height: MaybeProp<StyleValue>,
    #[prop(into, optional)] font_family: MaybeProp<String>,
    #[prop(into, optional)] color: MaybeProp<String>,
    // Container
    #[prop(into, optional)] border: MaybeProp<String>,
    #[prop(into, optional)] border_radius: MaybeProp<StyleValue>,
    #[prop(into, optional)] padding: MaybeProp<StyleValue>,
    #[prop(into, optional)] max_height: MaybeProp<StyleValue>,
    #[prop(into, optional)] overflow: MaybeProp<Overflow>,
    #[prop(into, optional)] background_color: MaybeProp<String>,
    #[prop(into, optional)] on_error: Option<Callback<SanitizeError>>,
) -> impl IntoView {
    let viewer = Viewer::new(shared_engine()).with_diagnostics(move |err| match on_error {
        Some(callback) => callback.run(err.clone()),
        None => warn_console(err),
    });
    let viewer = StoredValue::new_local(viewer);

    let (content, set_content) = signal(String::new());

    // Only `html` is tracked here
    Effect::new(move |_| {
        let raw = html.get();
        let Some(pending) = viewer.try_with_value(|v| v.set_content(raw.as_deref())) else {
            return;
        };
        spawn_local(async move {
            match pending.await {
                Outcome::Committed(safe) => set_content.set(safe.into_string()),
                Outcome::Degraded(_) => set_content.set(String::new()),
                Outcome::Discarded => {}
            }
        });
    });

    on_cleanup(move || {
        viewer.try_with_value(|v| v.unmount());
    });

    let resolved = Memo::new(move |_| {
        let typed = StyleOverrides {
            font_size: font_size.get(),
            line_height: line_height.get(),
            font_family: font_family.get(),
            color: color.get(),
            border: border.get(),
            border_radius: border_radius.get(),
            padding: padding.get(),
            max_height: max_height.get(),
            overflow: overflow.get(),
            background_color: background_color.get(),
        };
        resolve(&default_styles(), &typed, &style.get().unwrap_or_default())
    });

    // Keep the core surface in step with what the container renders
    Effect::new(move |_| {
        let style = resolved.get();
        let class = class.get();
        viewer.try_with_value(|v| v.apply_style(style, class));
    });

    view! {
        <div
            class=move || class.get().unwrap_or_default()
            style=move || resolved.get().to_css()
            inner_html=content
        />
    }
}
