//! Leptos component for displaying untrusted HTML.
//!
//! - [`RichTextViewer`] - Sanitizes its `html` prop and renders the result
//! - [`shared_engine`] - The lazily loaded sanitizer shared by every viewer

mod viewer;

pub use richtext_core::{Overflow, SanitizeError, StyleMap, StyleValue};
pub use viewer::{RichTextViewer, shared_engine};
