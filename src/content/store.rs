//! Content store - loads CMS documents from flat markdown files

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::document::{Document, DocumentFields, Field};
use super::FrontMatter;
use crate::error::ContentError;
use crate::Folio;

/// Query interface over a collection-based content store
pub trait ContentStore {
    /// Fetch one document by slug, or `None` when no visible document matches
    fn document_by_slug(
        &self,
        collection: &str,
        slug: &str,
        fields: &[Field],
    ) -> Result<Option<DocumentFields>, ContentError>;

    /// Fetch every visible document of a collection, in no particular order
    fn documents(
        &self,
        collection: &str,
        fields: &[Field],
    ) -> Result<Vec<DocumentFields>, ContentError>;

    /// Enumerate the slugs of every visible document of a collection
    fn document_slugs(&self, collection: &str) -> Result<Vec<String>, ContentError>;
}

/// Store reading `<content_dir>/<collection>/<slug>.md`
#[derive(Debug, Clone)]
pub struct FileStore {
    content_dir: PathBuf,
    include_drafts: bool,
}

impl FileStore {
    /// Create a store rooted at `content_dir`
    pub fn new<P: AsRef<Path>>(content_dir: P, include_drafts: bool) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            include_drafts,
        }
    }

    /// Create the store configured for a site
    pub fn for_site(folio: &Folio) -> Self {
        Self::new(&folio.content_dir, folio.config.render_drafts)
    }

    /// Load every visible document of a collection, skipping unreadable files
    pub fn load_collection(&self, collection: &str) -> Result<Vec<Document>, ContentError> {
        let dir = self.content_dir.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match load_document(path) {
                    Ok(doc) => {
                        if self.is_visible(&doc) {
                            documents.push(doc);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load document {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(documents)
    }

    /// Load a single visible document by slug
    pub fn load_by_slug(
        &self,
        collection: &str,
        slug: &str,
    ) -> Result<Option<Document>, ContentError> {
        if !is_safe_slug(slug) {
            return Ok(None);
        }

        let dir = self.content_dir.join(collection);

        // Files are usually named after their slug
        for ext in ["md", "mdx", "markdown"] {
            let candidate = dir.join(format!("{}.{}", slug, ext));
            if candidate.is_file() {
                let doc = load_document(&candidate)?;
                if doc.slug == slug {
                    return Ok(Some(doc).filter(|d| self.is_visible(d)));
                }
            }
        }

        // Fall back to a scan for a front-matter slug that differs from the file name
        Ok(self
            .load_collection(collection)?
            .into_iter()
            .find(|d| d.slug == slug))
    }

    fn is_visible(&self, doc: &Document) -> bool {
        doc.published || self.include_drafts
    }
}

impl ContentStore for FileStore {
    fn document_by_slug(
        &self,
        collection: &str,
        slug: &str,
        fields: &[Field],
    ) -> Result<Option<DocumentFields>, ContentError> {
        Ok(self
            .load_by_slug(collection, slug)?
            .map(|doc| doc.select(fields)))
    }

    fn documents(
        &self,
        collection: &str,
        fields: &[Field],
    ) -> Result<Vec<DocumentFields>, ContentError> {
        Ok(self
            .load_collection(collection)?
            .iter()
            .map(|doc| doc.select(fields))
            .collect())
    }

    fn document_slugs(&self, collection: &str) -> Result<Vec<String>, ContentError> {
        Ok(self
            .load_collection(collection)?
            .into_iter()
            .map(|doc| doc.slug)
            .collect())
    }
}

/// Load a single document from a file
fn load_document(path: &Path) -> Result<Document, ContentError> {
    let raw = fs::read_to_string(path)?;
    let (fm, body) = FrontMatter::parse(&raw).map_err(|e| ContentError::FrontMatter {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let file_stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();

    let published_at = fm.parse_published_at();
    if published_at.is_none() && fm.published_at.is_some() {
        tracing::warn!("Unparseable publishedAt in {:?}", path);
    }

    // A slug the detail route cannot address falls back to the file name
    let slug = match fm.slug.as_deref().map(str::trim) {
        Some(slug) if is_safe_slug(slug) => slug.to_string(),
        Some(slug) if !slug.is_empty() => {
            tracing::warn!(
                "Unusable slug {:?} in {:?}, using {:?}",
                slug,
                path,
                file_stem
            );
            file_stem.clone()
        }
        _ => file_stem.clone(),
    };

    Ok(Document {
        slug,
        title: fm.title.clone().unwrap_or(file_stem),
        description: fm.description.clone().unwrap_or_default(),
        published_at,
        author: fm.author.clone(),
        content: body.to_string(),
        cover_image: fm.cover_image.clone().filter(|s| !s.is_empty()),
        published: fm.is_published(),
        source: path.to_path_buf(),
    })
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx" || e == "markdown")
        .unwrap_or(false)
}

/// Slugs never address anything outside their collection directory
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && slug != "." && slug != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let posts = dir.join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join(name), content).unwrap();
    }

    fn store_with_posts() -> (TempDir, FileStore) {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "first.md",
            "---\ntitle: First\nstatus: published\npublishedAt: '2023-01-01T00:00:00.000Z'\n---\nOne\n",
        );
        write(
            tmp.path(),
            "renamed-file.md",
            "---\ntitle: Second\nslug: second\npublishedAt: '2023-02-01T00:00:00.000Z'\n---\nTwo\n",
        );
        write(
            tmp.path(),
            "draft.md",
            "---\ntitle: Draft\nstatus: draft\n---\nWip\n",
        );
        write(tmp.path(), "notes.txt", "not a post");
        let store = FileStore::new(tmp.path(), false);
        (tmp, store)
    }

    #[test]
    fn test_documents_skip_drafts() {
        let (_tmp, store) = store_with_posts();
        let mut slugs = store.document_slugs("posts").unwrap();
        slugs.sort();
        assert_eq!(slugs, vec!["first", "second"]);
    }

    #[test]
    fn test_drafts_included_when_enabled() {
        let (tmp, _) = store_with_posts();
        let store = FileStore::new(tmp.path(), true);
        assert_eq!(store.document_slugs("posts").unwrap().len(), 3);
    }

    #[test]
    fn test_document_by_slug() {
        let (_tmp, store) = store_with_posts();
        let doc = store
            .document_by_slug("posts", "first", &[Field::Title, Field::Content])
            .unwrap()
            .unwrap();
        assert_eq!(doc.title.as_deref(), Some("First"));
        assert_eq!(doc.content.as_deref(), Some("One\n"));
        assert!(doc.slug.is_none());
    }

    #[test]
    fn test_document_by_frontmatter_slug() {
        let (_tmp, store) = store_with_posts();
        let doc = store
            .document_by_slug("posts", "second", &[Field::Title])
            .unwrap()
            .unwrap();
        assert_eq!(doc.title.as_deref(), Some("Second"));
        assert!(store
            .document_by_slug("posts", "renamed-file", &[Field::Title])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_and_hidden_documents() {
        let (_tmp, store) = store_with_posts();
        assert!(store
            .document_by_slug("posts", "nope", &Field::ALL)
            .unwrap()
            .is_none());
        assert!(store
            .document_by_slug("posts", "draft", &Field::ALL)
            .unwrap()
            .is_none());
        assert!(store
            .document_by_slug("posts", "../posts/first", &Field::ALL)
            .unwrap()
            .is_none());
        assert!(store.documents("missing", &Field::ALL).unwrap().is_empty());
    }

    #[test]
    fn test_listed_slugs_always_resolve() {
        let (tmp, store) = store_with_posts();
        write(
            tmp.path(),
            "nested.md",
            "---\ntitle: Nested\nslug: 2023/intro\n---\nBody\n",
        );
        write(tmp.path(), "dots.md", "---\ntitle: Dots\nslug: '..'\n---\nBody\n");

        let mut slugs = store.document_slugs("posts").unwrap();
        slugs.sort();
        assert_eq!(slugs, vec!["dots", "first", "nested", "second"]);
        for slug in &slugs {
            assert!(
                store
                    .document_by_slug("posts", slug, &[Field::Slug])
                    .unwrap()
                    .is_some(),
                "listed slug {:?} did not resolve",
                slug
            );
        }
    }
}
