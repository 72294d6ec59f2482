//! folio-rs: a personal portfolio and blog site
//!
//! Posts live as flat markdown files written by a git-based CMS. This crate
//! resolves them, renders their bodies through a type-dispatched pipeline
//! with syntax-highlighted code blocks, and serves or pre-generates the
//! home, blog, post and about pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod highlight;
pub mod render;
pub mod server;
pub mod site;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::Path;

/// The main site application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// CMS content directory (one sub-directory per collection)
    pub content_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: std::path::PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        // Extra grammars are looked up relative to the site, not the working directory
        if let Some(dir) = config.highlight.syntaxes_dir.as_mut() {
            *dir = base_dir.join(&*dir).to_string_lossy().into_owned();
        }

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        })
    }

    /// Site root path, always ending with `/`
    pub fn root(&self) -> String {
        format!("{}/", self.config.root.trim_end_matches('/'))
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, draft: bool) -> Result<()> {
        commands::new::create_post(self, title, draft).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.content_dir, tmp.path().join("outstatic/content"));
        assert_eq!(folio.public_dir, tmp.path().join("public"));
        assert_eq!(folio.root(), "/");
    }

    #[test]
    fn test_new_with_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("_config.yml"),
            "root: /site\ncontent_dir: content\npublic_dir: dist\n",
        )
        .unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.content_dir, tmp.path().join("content"));
        assert_eq!(folio.public_dir, tmp.path().join("dist"));
        assert_eq!(folio.root(), "/site/");
    }
}
