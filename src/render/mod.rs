//! Rendering pipeline: markdown body to displayable markup
//!
//! The body is parsed into an element tree ([`tree`]), each element is
//! dispatched to a renderer by type ([`Renderer`]), and the result is written
//! out as HTML with code blocks going through the highlighter.

mod renderer;
pub mod tree;

pub use renderer::{code_block, extract_language, Components, ElementKind, Rendered, Renderer};
pub use tree::{parse, Attributes, Element, Node};

use serde::Serialize;

use crate::error::RenderError;
use crate::highlight::Highlighter;

/// A fenced code block handed to the display component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Source with surrounding whitespace stripped
    pub source: String,
    /// Language tag, empty for no highlighting
    pub language: String,
}

/// Render markdown with default components and the global highlighter
pub fn render_markdown(markdown: &str) -> Result<String, RenderError> {
    Renderer::new(Components::default(), Highlighter::global()).render_markdown(markdown)
}

/// Simple HTML escaping
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
