//! Generator module - pre-renders every route to static HTML files

use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::site::Site;
use crate::templates::STYLESHEET;
use crate::Folio;

/// Static site generator
pub struct Generator {
    folio: Folio,
    site: Site,
}

/// Summary of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            site: Site::new(folio)?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.folio.public_dir)?;

        let mut stats = GenerateStats {
            assets: self.copy_static_assets()?,
            ..Default::default()
        };

        self.write("css/site.css", STYLESHEET)?;

        self.write("index.html", &self.site.render_home()?)?;
        self.write("blog/index.html", &self.site.render_blog_index()?)?;
        self.write("about/index.html", &self.site.render_about()?)?;
        self.write("404.html", &self.site.render_not_found()?)?;
        stats.pages += 4;

        // One page per slug the store can enumerate
        for slug in self.site.post_slugs()? {
            let html = self
                .site
                .render_post(&slug)
                .map_err(|e| anyhow!("Failed to render post {:?}: {}", slug, e))?;
            self.write(&format!("blog/{}/index.html", slug), &html)?;
            stats.posts += 1;
        }

        tracing::info!(
            "Generated {} posts, {} pages, {} assets",
            stats.posts,
            stats.pages,
            stats.assets
        );

        Ok(stats)
    }

    /// Write a file relative to the public directory
    fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let output_path = self.folio.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    /// Copy static assets (images, favicon, etc.) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}
