//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary; pages are rendered from the
//! context structs defined here.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::theme::ThemeControl;

/// Stylesheet written to `css/site.css`
pub const STYLESHEET: &str = include_str!("site/site.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("about.html", include_str!("site/about.html")),
            ("404.html", include_str!("site/404.html")),
            // Partials
            (
                "partials/navbar.html",
                include_str!("site/partials/navbar.html"),
            ),
            (
                "partials/blog_card.html",
                include_str!("site/partials/blog_card.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub favicon: String,
    pub url: String,
    pub root: String,
    pub default_theme: String,
}

/// One entry of a post listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Display date, e.g. `Tue Mar 07 2023`; empty when undated
    pub date: String,
    pub date_iso: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub cover_image: String,
    pub date: String,
    pub date_iso: String,
    /// Rendered body markup
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutData {
    pub name: String,
    pub location: String,
    /// Rendered inline markup, one entry per paragraph
    pub bio: Vec<String>,
    pub links: Vec<LinkItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkItem {
    pub label: String,
    pub href: String,
}

/// Context shared by every page
pub fn base_context(site: &SiteData, about: &AboutData, controls: &[ThemeControl]) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("about", about);
    context.insert("theme_controls", controls);
    context
}
