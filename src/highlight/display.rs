//! Code block display: highlighted markup plus a copy control

use super::Highlighter;
use crate::render::{escape_html, CodeBlock};

/// Write-only system clipboard
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// The "Copy" button of a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyControl {
    payload: String,
}

impl CopyControl {
    pub fn new(source: &str) -> Self {
        Self {
            payload: source.to_string(),
        }
    }

    /// Exact text placed on the clipboard
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Copy the payload. Failures are logged and otherwise ignored.
    pub fn trigger<C: Clipboard + ?Sized>(&self, clipboard: &mut C) {
        if let Err(e) = clipboard.write_text(&self.payload) {
            tracing::debug!("Clipboard write failed: {}", e);
        }
    }

    /// Button markup; the browser-side handler copies `data-copy` verbatim
    pub fn to_html(&self) -> String {
        format!(
            r#"<button class="copy-button" type="button" data-copy="{}">Copy</button>"#,
            escape_html(&self.payload)
        )
    }
}

/// Renders code blocks as scrollable, line-grouped token spans
pub struct CodeBlockDisplay<'a> {
    highlighter: &'a Highlighter,
}

impl<'a> CodeBlockDisplay<'a> {
    pub fn new(highlighter: &'a Highlighter) -> Self {
        Self { highlighter }
    }

    /// The copy control for a block
    pub fn copy_control(&self, block: &CodeBlock) -> CopyControl {
        CopyControl::new(&block.source)
    }

    /// Render a block to HTML
    pub fn render(&self, block: &CodeBlock) -> String {
        let lines = self.highlighter.tokenize(&block.source, &block.language);

        let mut style = String::new();
        if let Some(bg) = self.highlighter.background() {
            style.push_str(&format!("background-color:{};", bg));
        }
        if let Some(fg) = self.highlighter.foreground() {
            style.push_str(&format!("color:{};", fg));
        }

        let class = if block.language.is_empty() {
            "code-block".to_string()
        } else {
            format!("code-block language-{}", escape_html(&block.language))
        };

        let mut html = String::with_capacity(block.source.len() * 4);
        html.push_str(&format!(r#"<pre class="{}" style="{}">"#, class, style));
        html.push_str(&self.copy_control(block).to_html());
        html.push_str(r#"<code class="code-lines">"#);

        for line in &lines {
            html.push_str(r#"<div class="token-line">"#);
            for token in line {
                let css = token.style.css();
                if css.is_empty() {
                    html.push_str(&format!("<span>{}</span>", escape_html(&token.text)));
                } else {
                    html.push_str(&format!(
                        r#"<span style="{}">{}</span>"#,
                        css,
                        escape_html(&token.text)
                    ));
                }
            }
            html.push_str("</div>");
        }

        html.push_str("</code></pre>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Option<String>,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> std::io::Result<()> {
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    struct DeniedClipboard;

    impl Clipboard for DeniedClipboard {
        fn write_text(&mut self, _text: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "clipboard access denied",
            ))
        }
    }

    fn block(source: &str, language: &str) -> CodeBlock {
        CodeBlock {
            source: source.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_copy_places_exact_source() {
        let highlighter = Highlighter::new(&HighlightConfig::default()).unwrap();
        let display = CodeBlockDisplay::new(&highlighter);
        let source = "const tag = `<b>${x}</b>` && \"y\";\n\tindented";
        let control = display.copy_control(&block(source, "typescript"));

        let mut clipboard = MemoryClipboard::default();
        control.trigger(&mut clipboard);
        assert_eq!(clipboard.contents.as_deref(), Some(source));
    }

    #[test]
    fn test_copy_failure_is_ignored() {
        CopyControl::new("ls").trigger(&mut DeniedClipboard);
    }

    #[test]
    fn test_copy_button_escapes_payload() {
        let html = CopyControl::new(r#"<a href="x">&</a>"#).to_html();
        assert!(html.contains(r#"data-copy="&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;""#));
    }

    #[test]
    fn test_render_groups_lines() {
        let highlighter = Highlighter::new(&HighlightConfig::default()).unwrap();
        let display = CodeBlockDisplay::new(&highlighter);
        let html = display.render(&block("{\n  \"a\": 1\n}", "json"));
        assert!(html.starts_with(r#"<pre class="code-block language-json""#));
        assert_eq!(html.matches(r#"<div class="token-line">"#).count(), 3);
        assert!(html.contains("Copy</button>"));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn test_render_without_language() {
        let highlighter = Highlighter::new(&HighlightConfig::default()).unwrap();
        let display = CodeBlockDisplay::new(&highlighter);
        let html = display.render(&block("x < y", ""));
        assert!(html.starts_with(r#"<pre class="code-block" "#));
        assert!(html.contains("<span>x &lt; y</span>"));
    }
}
