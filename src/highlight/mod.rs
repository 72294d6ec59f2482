//! Syntax highlighting for fenced code blocks
//!
//! The highlighter is process-wide and initialized once at startup with an
//! explicit list of languages. Tokenization is pure: the same source and
//! language always produce the same token stream.

mod display;

pub use display::{Clipboard, CodeBlockDisplay, CopyControl};

use anyhow::Result;
use std::collections::HashMap;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::HighlightConfig;

/// Theme used when the configured one does not exist
const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Grammars to try for language names the default syntax set lacks
const GRAMMAR_ALIASES: &[(&str, &[&str])] = &[
    ("typescript", &["typescript", "ts", "js"]),
    ("ts", &["typescript", "ts", "js"]),
    ("tsx", &["tsx", "typescript", "js"]),
    ("jsx", &["jsx", "js"]),
    ("bash", &["bash", "sh"]),
    ("shell", &["bash", "sh"]),
    ("sh", &["sh", "bash"]),
    ("zsh", &["bash", "sh"]),
    ("json", &["json", "js"]),
    ("graphql", &["graphql", "gql"]),
    ("gql", &["graphql", "gql"]),
    ("yml", &["yaml"]),
];

static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();

/// Styling of a single token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStyle {
    /// `#rrggbb`, or `None` to inherit the block color
    pub foreground: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TokenStyle {
    /// Inline CSS for this style
    pub fn css(&self) -> String {
        let mut css = String::new();
        if let Some(color) = &self.foreground {
            css.push_str("color:");
            css.push_str(color);
            css.push(';');
        }
        if self.bold {
            css.push_str("font-weight:bold;");
        }
        if self.italic {
            css.push_str("font-style:italic;");
        }
        if self.underline {
            css.push_str("text-decoration:underline;");
        }
        css
    }
}

/// A classified span of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub style: TokenStyle,
}

/// Tokens of one source line, without the line terminator
pub type Line = Vec<Token>;

/// Language-aware tokenizer backed by syntect
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    /// Registered language name -> syntect syntax name
    languages: HashMap<String, String>,
}

impl Highlighter {
    /// Build a highlighter from configuration
    pub fn new(config: &HighlightConfig) -> Result<Self> {
        let syntax_set = match &config.syntaxes_dir {
            Some(dir) => {
                let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
                builder.add_from_folder(dir, true)?;
                tracing::debug!("Loaded extra grammars from {:?}", dir);
                builder.build()
            }
            None => SyntaxSet::load_defaults_newlines(),
        };

        Ok(Self::with_syntax_set(
            syntax_set,
            &config.theme,
            &config.languages,
        ))
    }

    fn with_syntax_set(syntax_set: SyntaxSet, theme_name: &str, languages: &[String]) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using {}",
                    theme_name,
                    FALLBACK_THEME
                );
                theme_set
                    .themes
                    .remove(FALLBACK_THEME)
                    .unwrap_or_default()
            }
        };

        let mut highlighter = Self {
            syntax_set,
            theme,
            languages: HashMap::new(),
        };
        for language in languages {
            highlighter.register(language);
        }
        highlighter
    }

    /// Register a language name, resolving it to a grammar.
    /// Returns false when no grammar matches; the name then tokenizes as plain text.
    pub fn register(&mut self, language: &str) -> bool {
        let language = language.trim().to_lowercase();
        let syntax_name = self.find_grammar(&language).map(|s| s.name.clone());

        match syntax_name {
            Some(name) => {
                tracing::debug!("Registered language {} -> {}", language, name);
                self.languages.insert(language, name);
                true
            }
            None => {
                tracing::debug!("No grammar for language {}, plain text", language);
                false
            }
        }
    }

    /// Initialize the process-wide highlighter. Later calls keep the first instance.
    pub fn init(config: &HighlightConfig) -> Result<&'static Highlighter> {
        if let Some(existing) = HIGHLIGHTER.get() {
            tracing::debug!("Highlighter already initialized");
            return Ok(existing);
        }
        let highlighter = Self::new(config)?;
        Ok(HIGHLIGHTER.get_or_init(|| highlighter))
    }

    /// The process-wide highlighter, initialized with defaults if `init` was never called
    pub fn global() -> &'static Highlighter {
        HIGHLIGHTER.get_or_init(|| {
            let defaults = HighlightConfig::default();
            Self::with_syntax_set(
                SyntaxSet::load_defaults_newlines(),
                &defaults.theme,
                &defaults.languages,
            )
        })
    }

    /// Whether `language` resolves to a grammar other than plain text
    pub fn supports(&self, language: &str) -> bool {
        let plain = self.syntax_set.find_syntax_plain_text().name.as_str();
        self.syntax_for(language).name != plain
    }

    /// Block background color from the theme
    pub fn background(&self) -> Option<String> {
        self.theme.settings.background.map(hex)
    }

    /// Block foreground color from the theme
    pub fn foreground(&self) -> Option<String> {
        self.theme.settings.foreground.map(hex)
    }

    /// Split `source` into lines of styled tokens. Never fails: unknown or empty
    /// languages and grammar errors produce unstyled tokens.
    pub fn tokenize(&self, source: &str, language: &str) -> Vec<Line> {
        let syntax = self.syntax_for(language);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(source) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => lines.push(self.to_tokens(&ranges)),
                Err(e) => {
                    tracing::debug!("Highlighting failed for {:?}: {}", language, e);
                    return plain_lines(source);
                }
            }
        }

        lines
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        let language = language.trim().to_lowercase();
        if language.is_empty() {
            return self.syntax_set.find_syntax_plain_text();
        }

        self.languages
            .get(&language)
            .and_then(|name| self.syntax_set.find_syntax_by_name(name))
            .or_else(|| self.syntax_set.find_syntax_by_token(&language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn find_grammar(&self, language: &str) -> Option<&SyntaxReference> {
        let candidates = GRAMMAR_ALIASES
            .iter()
            .find(|(name, _)| *name == language)
            .map(|(_, tokens)| *tokens)
            .unwrap_or(&[]);

        std::iter::once(language)
            .chain(candidates.iter().copied())
            .find_map(|token| {
                self.syntax_set
                    .find_syntax_by_token(token)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(token))
            })
    }

    fn to_tokens(&self, ranges: &[(Style, &str)]) -> Line {
        let block_fg = self.theme.settings.foreground;
        ranges
            .iter()
            .filter_map(|(style, text)| {
                let text = strip_line_ending(text);
                if text.is_empty() {
                    return None;
                }
                let foreground = if Some(style.foreground) == block_fg {
                    None
                } else {
                    Some(hex(style.foreground))
                };
                Some(Token {
                    text: text.to_string(),
                    style: TokenStyle {
                        foreground,
                        bold: style.font_style.contains(FontStyle::BOLD),
                        italic: style.font_style.contains(FontStyle::ITALIC),
                        underline: style.font_style.contains(FontStyle::UNDERLINE),
                    },
                })
            })
            .collect()
    }
}

/// Unstyled tokens, one per non-empty line
fn plain_lines(source: &str) -> Vec<Line> {
    LinesWithEndings::from(source)
        .map(|line| {
            let text = strip_line_ending(line);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Token {
                    text: text.to_string(),
                    style: TokenStyle::default(),
                }]
            }
        })
        .collect()
}

fn strip_line_ending(text: &str) -> &str {
    text.strip_suffix('\n')
        .map(|t| t.strip_suffix('\r').unwrap_or(t))
        .unwrap_or(text)
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> Highlighter {
        Highlighter::new(&HighlightConfig::default()).unwrap()
    }

    fn line_text(line: &Line) -> String {
        line.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let h = highlighter();
        let source = "const x = 1;\nfunction f(a) {\n  return a * 2;\n}";
        for lang in ["typescript", "json", "bash", "", "no-such-language"] {
            assert_eq!(h.tokenize(source, lang), h.tokenize(source, lang));
        }
    }

    #[test]
    fn test_tokens_preserve_source_text() {
        let h = highlighter();
        let source = "echo \"hi\"\n\nls -la | grep rs";
        let lines = h.tokenize(source, "bash");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["echo \"hi\"", "", "ls -la | grep rs"]);
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        let h = highlighter();
        let lines = h.tokenize("SELECT 1;\nSELECT 2;", "");
        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .flatten()
            .all(|t| t.style.foreground.is_none() && !t.style.bold));

        let lines = h.tokenize("a b c", "klingon");
        assert_eq!(line_text(&lines[0]), "a b c");
        assert!(!h.supports("klingon"));
        assert!(!h.supports(""));
    }

    #[test]
    fn test_registered_languages() {
        let h = highlighter();
        assert!(h.supports("bash"));
        assert!(h.supports("json"));
        // typescript falls back to the JavaScript grammar in the default set
        assert!(h.supports("typescript"));
        assert!(h.supports("TypeScript"));
    }

    #[test]
    fn test_highlighting_styles_keywords() {
        let h = highlighter();
        let lines = h.tokenize("const x = 1;", "typescript");
        assert!(lines[0].iter().any(|t| t.style.foreground.is_some()));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = HighlightConfig {
            theme: "does-not-exist".to_string(),
            ..Default::default()
        };
        let h = Highlighter::new(&config).unwrap();
        assert!(h.background().is_some());
    }

    #[test]
    fn test_global_is_initialized_once() {
        let a = Highlighter::global() as *const Highlighter;
        let b = Highlighter::init(&HighlightConfig::default()).unwrap() as *const Highlighter;
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_style_css() {
        let style = TokenStyle {
            foreground: Some("#ff0000".to_string()),
            bold: true,
            italic: false,
            underline: false,
        };
        assert_eq!(style.css(), "color:#ff0000;font-weight:bold;");
        assert_eq!(TokenStyle::default().css(), "");
    }
}
