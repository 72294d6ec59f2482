//! Type-dispatched element renderers

use lazy_static::lazy_static;
use regex::Regex;

use super::tree::{is_void, parse, Attributes, Element, Node};
use super::{escape_html, CodeBlock};
use crate::config::ComponentsConfig;
use crate::error::RenderError;
use crate::highlight::{CodeBlockDisplay, Highlighter};

lazy_static! {
    static ref LANGUAGE_CLASS: Regex = Regex::new(r"language-(?P<lang>.*)").unwrap();
}

/// Element types with a dedicated renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Heading2,
    Link,
    CodeBlock,
    Other,
}

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        match tag {
            "p" => ElementKind::Paragraph,
            "h2" => ElementKind::Heading2,
            "a" => ElementKind::Link,
            "pre" => ElementKind::CodeBlock,
            _ => ElementKind::Other,
        }
    }
}

/// Output of the pipeline, ready to be written as HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Html(String),
    Paragraph {
        attrs: Attributes,
        children: Vec<Rendered>,
    },
    Heading2 {
        attrs: Attributes,
        children: Vec<Rendered>,
    },
    Link {
        attrs: Attributes,
        children: Vec<Rendered>,
    },
    CodeBlock(CodeBlock),
    /// Any other element, tag and attributes forwarded unchanged
    Passthrough {
        tag: String,
        attrs: Attributes,
        children: Vec<Rendered>,
    },
}

/// Per-node-type overrides applied by the renderers
#[derive(Debug, Clone)]
pub struct Components {
    pub paragraph_class: String,
    pub heading_class: String,
    pub external_links_new_tab: bool,
}

impl Default for Components {
    fn default() -> Self {
        Self::from(&ComponentsConfig::default())
    }
}

impl From<&ComponentsConfig> for Components {
    fn from(config: &ComponentsConfig) -> Self {
        Self {
            paragraph_class: config.paragraph_class.clone(),
            heading_class: config.heading_class.clone(),
            external_links_new_tab: config.external_links_new_tab,
        }
    }
}

/// Extract the language tag from a code element class.
/// Returns an empty string when the class has no `language-` part.
pub fn extract_language(class: &str) -> String {
    LANGUAGE_CLASS
        .captures(class)
        .and_then(|caps| caps.name("lang"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Build a code block from a `pre` element shaped `pre > code > text`
pub fn code_block(pre: &Element) -> Result<CodeBlock, RenderError> {
    let code = pre
        .children
        .iter()
        .find_map(|child| match child {
            Node::Element(el) if el.tag == "code" => Some(el),
            _ => None,
        })
        .ok_or_else(|| RenderError::MalformedCodeBlock("pre without a code child".to_string()))?;

    let mut source = String::new();
    for child in &code.children {
        match child {
            Node::Text(text) => source.push_str(text),
            Node::Element(el) => {
                return Err(RenderError::MalformedCodeBlock(format!(
                    "unexpected <{}> inside code",
                    el.tag
                )))
            }
            Node::Html(_) => {
                return Err(RenderError::MalformedCodeBlock(
                    "raw html inside code".to_string(),
                ))
            }
        }
    }

    Ok(CodeBlock {
        source: source.trim().to_string(),
        language: extract_language(code.attrs.get("class").unwrap_or("")),
    })
}

/// The rendering pipeline: element tree in, rendered tree or HTML out
pub struct Renderer<'a> {
    components: Components,
    display: CodeBlockDisplay<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(components: Components, highlighter: &'a Highlighter) -> Self {
        Self {
            components,
            display: CodeBlockDisplay::new(highlighter),
        }
    }

    /// Render a node list
    pub fn render(&self, nodes: &[Node]) -> Result<Vec<Rendered>, RenderError> {
        nodes.iter().map(|node| self.render_node(node)).collect()
    }

    /// Parse and render markdown to HTML
    pub fn render_markdown(&self, markdown: &str) -> Result<String, RenderError> {
        let rendered = self.render(&parse(markdown))?;
        Ok(self.to_html(&rendered))
    }

    /// Render a one-paragraph snippet without its paragraph wrapper
    pub fn render_inline(&self, markdown: &str) -> Result<String, RenderError> {
        let rendered = self.render(&parse(markdown))?;
        if let [Rendered::Paragraph { children, .. }] = rendered.as_slice() {
            return Ok(self.to_html(children));
        }
        Ok(self.to_html(&rendered))
    }

    fn render_node(&self, node: &Node) -> Result<Rendered, RenderError> {
        match node {
            Node::Text(text) => Ok(Rendered::Text(text.clone())),
            Node::Html(html) => Ok(Rendered::Html(html.clone())),
            Node::Element(el) => self.render_element(el),
        }
    }

    fn render_element(&self, el: &Element) -> Result<Rendered, RenderError> {
        match ElementKind::of(&el.tag) {
            ElementKind::Paragraph => Ok(Rendered::Paragraph {
                attrs: with_class(&el.attrs, &self.components.paragraph_class),
                children: self.render(&el.children)?,
            }),
            ElementKind::Heading2 => Ok(Rendered::Heading2 {
                attrs: with_class(&el.attrs, &self.components.heading_class),
                children: self.render(&el.children)?,
            }),
            ElementKind::Link => {
                let mut attrs = el.attrs.clone();
                let external = attrs
                    .get("href")
                    .map(|href| href.starts_with("http://") || href.starts_with("https://"))
                    .unwrap_or(false);
                if external && self.components.external_links_new_tab {
                    attrs.set("target", "_blank");
                    attrs.set("rel", "noopener noreferrer");
                }
                Ok(Rendered::Link {
                    attrs,
                    children: self.render(&el.children)?,
                })
            }
            ElementKind::CodeBlock => Ok(Rendered::CodeBlock(code_block(el)?)),
            ElementKind::Other => Ok(Rendered::Passthrough {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                children: self.render(&el.children)?,
            }),
        }
    }

    /// Serialize a rendered tree to HTML
    pub fn to_html(&self, rendered: &[Rendered]) -> String {
        let mut out = String::new();
        for node in rendered {
            self.write_html(node, &mut out);
        }
        out
    }

    fn write_html(&self, node: &Rendered, out: &mut String) {
        match node {
            Rendered::Text(text) => out.push_str(&escape_html(text)),
            Rendered::Html(html) => out.push_str(html),
            Rendered::Paragraph { attrs, children } => {
                self.write_element("p", attrs, children, out)
            }
            Rendered::Heading2 { attrs, children } => {
                self.write_element("h2", attrs, children, out)
            }
            Rendered::Link { attrs, children } => self.write_element("a", attrs, children, out),
            Rendered::CodeBlock(block) => out.push_str(&self.display.render(block)),
            Rendered::Passthrough {
                tag,
                attrs,
                children,
            } => self.write_element(tag, attrs, children, out),
        }
    }

    fn write_element(&self, tag: &str, attrs: &Attributes, children: &[Rendered], out: &mut String) {
        out.push('<');
        out.push_str(tag);
        for (name, value) in attrs.iter() {
            if value.is_empty() && matches!(name, "checked" | "disabled") {
                out.push_str(&format!(" {}", name));
            } else {
                out.push_str(&format!(r#" {}="{}""#, name, escape_html(value)));
            }
        }
        out.push('>');
        if is_void(tag) {
            return;
        }
        for child in children {
            self.write_html(child, out);
        }
        out.push_str(&format!("</{}>", tag));
        if matches!(tag, "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "li" | "table" | "blockquote") {
            out.push('\n');
        }
    }
}

/// Override the class attribute, keeping every other attribute
fn with_class(attrs: &Attributes, class: &str) -> Attributes {
    let mut attrs = attrs.clone();
    if !class.is_empty() {
        attrs.set("class", class);
    }
    attrs
}
