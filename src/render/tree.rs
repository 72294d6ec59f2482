//! Markdown to element tree
//!
//! pulldown-cmark events are folded into a small hast-like tree so renderers
//! can be chosen per element type. Fenced code becomes
//! `pre > code.language-<info> > text`.

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

/// Ordered element attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A markup element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attrs(tag: &str, attrs: Attributes) -> Self {
        Self {
            tag: tag.to_string(),
            attrs,
            children: Vec::new(),
        }
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    fn push(&mut self, node: Node) {
        push_node(&mut self.children, node);
    }
}

/// A node of the element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    /// Raw HTML passed through from the source
    Html(String),
    Element(Element),
}

/// Elements without a closing tag
pub(crate) fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input")
}

/// Parse markdown into a list of top-level nodes
pub fn parse(markdown: &str) -> Vec<Node> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(markdown, options);

    let mut builder = TreeBuilder::default();
    for event in parser {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
    /// How many elements each open tag pushed (code blocks push `pre` and `code`)
    groups: Vec<usize>,
    in_table_head: bool,
    /// Body rows of the open table are wrapped in an implicit `tbody`
    in_table_body: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TreeBuilder {
    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => {
                let elements = self.open_tag(tag);
                self.groups.push(elements.len());
                self.open.extend(elements);
            }
            Event::End(tag) => {
                match tag {
                    TagEnd::TableHead => self.in_table_head = false,
                    TagEnd::Table if self.in_table_body => {
                        self.in_table_body = false;
                        self.close();
                    }
                    _ => {}
                }
                let count = self.groups.pop().unwrap_or(0);
                for _ in 0..count {
                    self.close();
                }
            }
            Event::Text(text) => self.append(Node::Text(text.to_string())),
            Event::Code(code) => {
                let mut el = Element::new("code");
                el.push(Node::Text(code.to_string()));
                self.append(Node::Element(el));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.append(Node::Html(html.to_string()))
            }
            Event::FootnoteReference(label) => {
                let mut link =
                    Element::with_attrs("a", Attributes::new().with("href", format!("#{}", label)));
                link.push(Node::Text(label.to_string()));
                let mut sup =
                    Element::with_attrs("sup", Attributes::new().with("class", "footnote-reference"));
                sup.push(Node::Element(link));
                self.append(Node::Element(sup));
            }
            Event::SoftBreak => self.append(Node::Text("\n".to_string())),
            Event::HardBreak => self.append(Node::Element(Element::new("br"))),
            Event::Rule => self.append(Node::Element(Element::new("hr"))),
            Event::TaskListMarker(checked) => {
                let mut attrs = Attributes::new()
                    .with("type", "checkbox")
                    .with("disabled", "");
                if checked {
                    attrs.set("checked", "");
                }
                self.append(Node::Element(Element::with_attrs("input", attrs)));
            }
            _ => {}
        }
    }

    fn open_tag(&mut self, tag: Tag) -> Vec<Element> {
        match tag {
            Tag::Paragraph => vec![Element::new("p")],
            Tag::Heading {
                level, id, classes, ..
            } => {
                let mut attrs = Attributes::new();
                if let Some(id) = id {
                    attrs.set("id", id.to_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
                    attrs.set("class", classes.join(" "));
                }
                vec![Element::with_attrs(heading_tag(level), attrs)]
            }
            Tag::BlockQuote(_) => vec![Element::new("blockquote")],
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        code.attrs.set("class", format!("language-{}", lang));
                    }
                }
                vec![Element::new("pre"), code]
            }
            Tag::List(Some(start)) => {
                let mut attrs = Attributes::new();
                if start != 1 {
                    attrs.set("start", start.to_string());
                }
                vec![Element::with_attrs("ol", attrs)]
            }
            Tag::List(None) => vec![Element::new("ul")],
            Tag::Item => vec![Element::new("li")],
            Tag::FootnoteDefinition(label) => vec![Element::with_attrs(
                "div",
                Attributes::new()
                    .with("class", "footnote-definition")
                    .with("id", label.to_string()),
            )],
            Tag::Table(alignments) => {
                self.alignments = alignments;
                vec![Element::new("table")]
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                vec![Element::new("thead"), Element::new("tr")]
            }
            Tag::TableRow => {
                if !self.in_table_body {
                    self.in_table_body = true;
                    self.open.push(Element::new("tbody"));
                }
                self.cell_index = 0;
                vec![Element::new("tr")]
            }
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let mut attrs = Attributes::new();
                let align = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    Some(Alignment::None) | None => None,
                };
                if let Some(align) = align {
                    attrs.set("style", format!("text-align: {}", align));
                }
                self.cell_index += 1;
                vec![Element::with_attrs(tag, attrs)]
            }
            Tag::Emphasis => vec![Element::new("em")],
            Tag::Strong => vec![Element::new("strong")],
            Tag::Strikethrough => vec![Element::new("del")],
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{}", dest_url),
                    _ => dest_url.to_string(),
                };
                let mut attrs = Attributes::new().with("href", href);
                if !title.is_empty() {
                    attrs.set("title", title.to_string());
                }
                vec![Element::with_attrs("a", attrs)]
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut attrs = Attributes::new().with("src", dest_url.to_string());
                if !title.is_empty() {
                    attrs.set("title", title.to_string());
                }
                vec![Element::with_attrs("img", attrs)]
            }
            // Raw HTML blocks arrive as Html events; the wrapper adds nothing
            Tag::HtmlBlock => Vec::new(),
            _ => vec![Element::new("div")],
        }
    }

    fn close(&mut self) {
        let Some(mut el) = self.open.pop() else {
            return;
        };
        if el.tag == "img" {
            // Image children are its alt text
            let alt = el.text_content();
            el.children.clear();
            el.attrs.set("alt", alt);
        }
        self.append(Node::Element(el));
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.push(node),
            None => push_node(&mut self.root, node),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close();
        }
        self.root
    }
}

/// Push a node, merging adjacent text
fn push_node(nodes: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(last)) = nodes.last_mut() {
            last.push_str(text);
            return;
        }
    }
    nodes.push(node);
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Html(_) => {}
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
