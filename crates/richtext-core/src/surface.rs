//! Render surface state: the single mount point's committed content,
//! resolved styles and class token.

use crate::generation::GenerationToken;
use crate::sanitize::SanitizedHtml;
use crate::style::StyleMap;

/// Where the surface's content is in the sanitize-then-commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPhase {
    /// No content.
    Idle,
    /// Waiting on the result for `token`. The previous output stays visible.
    Sanitizing(GenerationToken),
    /// The latest requested content is on display.
    Committed,
}

/// State of the mounted container.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    content: SanitizedHtml,
    phase: ContentPhase,
    style: StyleMap,
    class: Option<String>,
    mounted: bool,
}

impl RenderSurface {
    pub fn mount(style: StyleMap, class: Option<String>) -> Self {
        Self {
            content: SanitizedHtml::empty(),
            phase: ContentPhase::Idle,
            style,
            class,
            mounted: true,
        }
    }

    pub fn content(&self) -> &SanitizedHtml {
        &self.content
    }

    pub fn phase(&self) -> ContentPhase {
        self.phase
    }

    pub fn style(&self) -> &StyleMap {
        &self.style
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Replace presentation. Content is left alone.
    pub fn apply_style(&mut self, style: StyleMap, class: Option<String>) {
        if !self.mounted {
            return;
        }
        self.style = style;
        self.class = class;
    }

    /// Enter `Sanitizing`, keeping the current output on display.
    pub(crate) fn begin(&mut self, token: GenerationToken) {
        if self.mounted {
            self.phase = ContentPhase::Sanitizing(token);
        }
    }

    /// Show `content`. Empty content puts the surface back to `Idle`.
    pub(crate) fn commit(&mut self, content: SanitizedHtml) {
        if !self.mounted {
            return;
        }
        self.phase = if content.is_empty() {
            ContentPhase::Idle
        } else {
            ContentPhase::Committed
        };
        self.content = content;
    }

    /// Tear down. No further writes are accepted.
    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.content = SanitizedHtml::empty();
        self.phase = ContentPhase::Idle;
        self.style = StyleMap::new();
        self.class = None;
    }

    /// Serialize the surface as a `<div>` with its class, style and content.
    pub fn to_markup(&self) -> String {
        let mut out = String::from("<div");
        if let Some(class) = &self.class {
            out.push_str(" class=\"");
            push_escaped_attr(&mut out, class);
            out.push('"');
        }
        if !self.style.is_empty() {
            out.push_str(" style=\"");
            push_escaped_attr(&mut out, &self.style.to_css());
            out.push('"');
        }
        out.push('>');
        // Raw injection is the point: content has been sanitized
        out.push_str(self.content.as_str());
        out.push_str("</div>");
        out
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
