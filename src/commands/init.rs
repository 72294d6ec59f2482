//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Portfolio
description: Frontend developer writing about the web
author: John Doe
language: en
timezone: UTC
favicon: /favicon.png

# URL
url: http://example.com
root: /

# Directory
content_dir: outstatic/content
collection: posts
public_dir: public
static_dir: static

# Writing
render_drafts: false
home_posts: 4

# Theme: light, dark or system
default_theme: system

highlight:
  theme: base16-ocean.dark
  languages: [bash, typescript, json, graphql]

components:
  paragraph_class: post-paragraph
  heading_class: post-heading
  external_links_new_tab: true

about:
  name: John Doe
  location: Somewhere, Earth
  bio:
    - I build interfaces for the web.
  links:
    Github: https://github.com/
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?}", config_path);
    }

    let posts_dir = target_dir.join("outstatic/content/posts");
    fs::create_dir_all(&posts_dir)?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let now = chrono::Utc::now();
    let sample_post = format!(
        r#"---
title: 'Hello World'
status: 'published'
author:
  name: 'John Doe'
slug: 'hello-world'
description: 'The first post on this site'
coverImage: ''
publishedAt: '{}'
---

Welcome! This post was created by `folio init`. Edit it, or write a new one:

```bash
folio new "My New Post"
```

## Preview the site

```bash
folio server --open
```

## Build for deployment

```bash
folio generate
```
"#,
        now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );

    fs::write(posts_dir.join("hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{resolve, ContentStore, Field, FileStore};
    use crate::Folio;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.config.title, "My Portfolio");
        assert_eq!(folio.config.about.links.len(), 1);
        assert!(folio.static_dir.is_dir());

        let store = FileStore::for_site(&folio);
        assert_eq!(store.document_slugs("posts").unwrap(), vec!["hello-world"]);
        let doc = resolve(&store, "posts", "hello-world", &Field::ALL).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Hello World"));
        assert!(doc.published_at.is_some());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();
        assert!(init_site(tmp.path()).is_err());
    }
}
