//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA zone used when displaying publication dates
    pub timezone: String,
    pub favicon: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub collection: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    pub render_drafts: bool,

    // Home page
    pub home_posts: usize,

    // Theme provider default: "light", "dark" or "system"
    pub default_theme: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub components: ComponentsConfig,
    #[serde(default)]
    pub about: AboutConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: String::new(),
            favicon: "/favicon.png".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "outstatic/content".to_string(),
            collection: "posts".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            render_drafts: false,

            home_posts: 4,

            default_theme: "system".to_string(),

            highlight: HighlightConfig::default(),
            components: ComponentsConfig::default(),
            about: AboutConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configured timezone, if it names a known IANA zone
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return None;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                None
            }
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    /// Languages registered with the highlighter at startup
    pub languages: Vec<String>,
    /// Optional folder of extra `.sublime-syntax` grammars
    pub syntaxes_dir: Option<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            languages: vec![
                "bash".to_string(),
                "typescript".to_string(),
                "json".to_string(),
                "graphql".to_string(),
            ],
            syntaxes_dir: None,
        }
    }
}

/// Per-node renderer overrides for post bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    pub paragraph_class: String,
    pub heading_class: String,
    pub external_links_new_tab: bool,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            paragraph_class: "post-paragraph".to_string(),
            heading_class: "post-heading".to_string(),
            external_links_new_tab: true,
        }
    }
}

/// About page content
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AboutConfig {
    pub name: String,
    pub location: String,
    pub bio: Vec<String>,
    /// Contact links in display order (label -> href)
    pub links: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.collection, "posts");
        assert_eq!(config.home_posts, 4);
        assert_eq!(config.default_theme, "system");
        assert_eq!(config.highlight.languages.len(), 4);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Elizabeth Alcalá
author: Elizabeth
timezone: America/Lima
home_posts: 2
highlight:
  theme: InspiredGitHub
about:
  name: Elizabeth
  links:
    Twitter: https://twitter.com/example
    Github: https://github.com/example
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Elizabeth Alcalá");
        assert_eq!(config.home_posts, 2);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        // Unset nested fields keep their defaults
        assert_eq!(config.highlight.languages.len(), 4);
        assert_eq!(config.content_dir, "outstatic/content");
        let labels: Vec<_> = config.about.links.keys().cloned().collect();
        assert_eq!(labels, vec!["Twitter", "Github"]);
        assert_eq!(config.tz(), Some(chrono_tz::America::Lima));
    }

    #[test]
    fn test_unknown_timezone() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert_eq!(config.tz(), None);
    }
}
