//! Page rendering for every route of the site
//!
//! Each render is one linear pass: resolve the document(s), run the body
//! through the rendering pipeline, then fill the page template.

use anyhow::Result;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tera::Context;

use crate::content::{list_latest, resolve, ContentStore, DocumentFields, Field, FileStore};
use crate::error::SiteError;
use crate::highlight::Highlighter;
use crate::render::{Components, Renderer};
use crate::templates::{
    base_context, AboutData, LinkItem, PostCard, PostPage, SiteData, TemplateRenderer,
};
use crate::theme::{self, ThemeControl, ThemeToggle};
use crate::Folio;

/// Characters escaped when a slug is placed in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Renders the home, blog, post, about and 404 pages
pub struct Site {
    folio: Folio,
    store: Box<dyn ContentStore + Send + Sync>,
    templates: TemplateRenderer,
    renderer: Renderer<'static>,
    site_data: SiteData,
    about: AboutData,
    controls: Vec<ThemeControl>,
}

impl Site {
    /// Create a site renderer reading from the configured content directory
    pub fn new(folio: &Folio) -> Result<Self> {
        Self::with_store(folio, FileStore::for_site(folio))
    }

    /// Create a site renderer over an arbitrary content store
    pub fn with_store<S>(folio: &Folio, store: S) -> Result<Self>
    where
        S: ContentStore + Send + Sync + 'static,
    {
        let config = &folio.config;
        let highlighter = Highlighter::init(&config.highlight)?;
        let renderer = Renderer::new(Components::from(&config.components), highlighter);

        let site_data = SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            favicon: config.favicon.clone(),
            url: config.url.clone(),
            root: folio.root(),
            default_theme: theme::default_theme(&config.default_theme).to_string(),
        };

        let about = AboutData {
            name: if config.about.name.is_empty() {
                config.author.clone()
            } else {
                config.about.name.clone()
            },
            location: config.about.location.clone(),
            bio: config
                .about
                .bio
                .iter()
                .map(|paragraph| renderer.render_inline(paragraph))
                .collect::<Result<_, _>>()?,
            links: config
                .about
                .links
                .iter()
                .map(|(label, href)| LinkItem {
                    label: label.clone(),
                    href: href.clone(),
                })
                .collect(),
        };

        Ok(Self {
            folio: folio.clone(),
            store: Box::new(store),
            templates: TemplateRenderer::new()?,
            renderer,
            site_data,
            about,
            controls: ThemeToggle::controls(),
        })
    }

    fn collection(&self) -> &str {
        &self.folio.config.collection
    }

    /// Home page: intro plus the latest posts
    pub fn render_home(&self) -> Result<String, SiteError> {
        let posts = list_latest(
            self.store.as_ref(),
            self.collection(),
            &Field::LISTING,
            Some(self.folio.config.home_posts),
        )?;

        let mut context = self.context();
        context.insert("posts", &self.cards(&posts));
        Ok(self.templates.render("home.html", &context)?)
    }

    /// Blog listing, newest first
    pub fn render_blog_index(&self) -> Result<String, SiteError> {
        let posts = list_latest(self.store.as_ref(), self.collection(), &Field::LISTING, None)?;

        let mut context = self.context();
        context.insert("posts", &self.cards(&posts));
        Ok(self.templates.render("blog.html", &context)?)
    }

    /// Blog detail page. Unknown slugs yield `SiteError` with `is_not_found()`.
    pub fn render_post(&self, slug: &str) -> Result<String, SiteError> {
        let doc = resolve(self.store.as_ref(), self.collection(), slug, &Field::ALL)?;
        let content = self
            .renderer
            .render_markdown(doc.content.as_deref().unwrap_or(""))?;
        let (date, date_iso) = self.format_date(doc.published_at);

        let post = PostPage {
            slug: doc.slug.clone().unwrap_or_else(|| slug.to_string()),
            title: doc.title.clone().unwrap_or_default(),
            description: doc.description.clone().unwrap_or_default(),
            author: doc.author.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            cover_image: doc.cover_image.clone().unwrap_or_default(),
            date,
            date_iso,
            content,
        };

        let mut context = self.context();
        context.insert("post", &post);
        Ok(self.templates.render("post.html", &context)?)
    }

    /// Static about page
    pub fn render_about(&self) -> Result<String, SiteError> {
        Ok(self.templates.render("about.html", &self.context())?)
    }

    /// 404 page
    pub fn render_not_found(&self) -> Result<String, SiteError> {
        Ok(self.templates.render("404.html", &self.context())?)
    }

    /// Every slug the detail route can serve
    pub fn post_slugs(&self) -> Result<Vec<String>, SiteError> {
        Ok(self.store.document_slugs(self.collection())?)
    }

    /// Route path of a post
    pub fn post_url(&self, slug: &str) -> String {
        format!(
            "{}blog/{}/",
            self.site_data.root,
            utf8_percent_encode(slug, PATH_SEGMENT)
        )
    }

    fn context(&self) -> Context {
        base_context(&self.site_data, &self.about, &self.controls)
    }

    fn cards(&self, docs: &[DocumentFields]) -> Vec<PostCard> {
        docs.iter()
            .map(|doc| {
                let slug = doc.slug.clone().unwrap_or_default();
                let (date, date_iso) = self.format_date(doc.published_at);
                PostCard {
                    url: self.post_url(&slug),
                    slug,
                    title: doc.title.clone().unwrap_or_default(),
                    description: doc.description.clone().unwrap_or_default(),
                    date,
                    date_iso,
                }
            })
            .collect()
    }

    /// Display date (`Tue Mar 07 2023`) in the site timezone, plus RFC 3339
    fn format_date(&self, date: Option<DateTime<Utc>>) -> (String, String) {
        let Some(date) = date else {
            return (String::new(), String::new());
        };
        match self.folio.config.tz() {
            Some(tz) => {
                let local = date.with_timezone(&tz);
                (local.format("%a %b %d %Y").to_string(), local.to_rfc3339())
            }
            None => (date.format("%a %b %d %Y").to_string(), date.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn site_with_posts(posts: &[(&str, &str)]) -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("outstatic/content/posts");
        fs::create_dir_all(&dir).unwrap();
        for (name, body) in posts {
            fs::write(dir.join(name), body).unwrap();
        }
        let folio = Folio::new(tmp.path()).unwrap();
        let site = Site::new(&folio).unwrap();
        (tmp, site)
    }

    fn post(title: &str, date: &str, body: &str) -> String {
        format!(
            "---\ntitle: '{}'\nstatus: published\ndescription: 'About {}'\npublishedAt: '{}'\n---\n{}",
            title, title, date, body
        )
    }

    #[test]
    fn test_unknown_post_is_not_found() {
        let (_tmp, site) = site_with_posts(&[]);
        for slug in ["missing", "", "../etc"] {
            let err = site.render_post(slug).unwrap_err();
            assert!(err.is_not_found(), "slug {:?} gave {}", slug, err);
        }
        assert!(site.render_not_found().unwrap().contains("404"));
    }

    #[test]
    fn test_home_shows_latest_four() {
        let posts: Vec<(String, String)> = (1..=6)
            .map(|i| {
                (
                    format!("post-{}.md", i),
                    post(&format!("Post {}", i), &format!("2023-0{}-01T00:00:00.000Z", i), "Body"),
                )
            })
            .collect();
        let refs: Vec<(&str, &str)> = posts.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let (_tmp, site) = site_with_posts(&refs);

        let html = site.render_home().unwrap();
        assert_eq!(html.matches(r#"class="blog-card""#).count(), 4);
        let p6 = html.find("Post 6").unwrap();
        let p3 = html.find("Post 3").unwrap();
        assert!(p6 < p3);
        assert!(!html.contains("Post 2"));
        assert!(html.contains("View all"));

        let blog = site.render_blog_index().unwrap();
        assert_eq!(blog.matches(r#"class="blog-card""#).count(), 6);
    }

    #[test]
    fn test_render_post_page() {
        let body = "Intro paragraph.\n\n## Setup\n\n```typescript\n  const x = 1;  \n```\n";
        let (_tmp, site) = site_with_posts(&[(
            "hello.md",
            &post("Hello", "2023-03-07T01:59:39.000Z", body),
        )]);

        let html = site.render_post("hello").unwrap();
        assert!(html.contains(r#"<h1 class="post-title">Hello</h1>"#));
        assert!(html.contains("About Hello"));
        assert!(html.contains(r#"<h2 class="post-heading">Setup</h2>"#));
        assert!(html.contains(r#"data-copy="const x = 1;""#));
        assert!(html.contains("Tue Mar 07 2023"));
        assert_eq!(site.post_slugs().unwrap(), vec!["hello"]);
    }

    #[test]
    fn test_date_uses_timezone() {
        let tmp = TempDir::new().unwrap();
        let mut folio = Folio::new(tmp.path()).unwrap();
        folio.config = SiteConfig {
            timezone: "America/Lima".to_string(),
            ..Default::default()
        };
        let site = Site::new(&folio).unwrap();
        let date = Utc.with_ymd_and_hms(2023, 3, 7, 1, 59, 39).unwrap();
        let (display, iso) = site.format_date(Some(date));
        assert_eq!(display, "Mon Mar 06 2023");
        assert_eq!(iso, "2023-03-06T20:59:39-05:00");
        assert_eq!(site.format_date(None), (String::new(), String::new()));
    }

    #[test]
    fn test_about_bio_allows_inline_markup() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("_config.yml"),
            "about:\n  name: Jane\n  bio:\n    - I work with **React** and <b>Typescript</b>.\n    - 'Plain & simple'\n",
        )
        .unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let html = Site::new(&folio).unwrap().render_about().unwrap();
        assert!(html.contains(
            r#"<div class="about-line">I work with <strong>React</strong> and <b>Typescript</b>.</div>"#
        ));
        assert!(html.contains(r#"<div class="about-line">Plain &amp; simple</div>"#));
    }

    #[test]
    fn test_post_url_encodes_slug() {
        let (_tmp, site) = site_with_posts(&[]);
        assert_eq!(site.post_url("hello-world"), "/blog/hello-world/");
        assert_eq!(site.post_url("a b?"), "/blog/a%20b%3F/");
    }
}
