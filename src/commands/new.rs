//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Create `<slug>.md` in the configured collection and return its path
pub fn create_post(folio: &Folio, title: &str, draft: bool) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }

    let target_dir = folio.content_dir.join(&folio.config.collection);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Utc::now();
    let content = format!(
        "---\ntitle: '{}'\nstatus: '{}'\nauthor:\n  name: '{}'\nslug: '{}'\ndescription: ''\ncoverImage: ''\npublishedAt: '{}'\n---\n",
        yaml_quote(title),
        if draft { "draft" } else { "published" },
        yaml_quote(&folio.config.author),
        slug,
        now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    );

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Escape a value for a single-quoted YAML scalar
fn yaml_quote(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_front_matter() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let path = create_post(&folio, "Rust's Ownership, Explained", false).unwrap();
        assert_eq!(
            path,
            folio.content_dir.join("posts/rust-s-ownership-explained.md")
        );

        let raw = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Rust's Ownership, Explained"));
        assert_eq!(fm.slug.as_deref(), Some("rust-s-ownership-explained"));
        assert!(fm.is_published());
        assert!(fm.parse_published_at().is_some());
        assert!(body.trim().is_empty());
    }

    #[test]
    fn test_create_draft_and_duplicate() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let path = create_post(&folio, "Later", true).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&raw).unwrap();
        assert!(!fm.is_published());

        assert!(create_post(&folio, "Later", false).is_err());
        assert!(create_post(&folio, "???", false).is_err());
    }
}
