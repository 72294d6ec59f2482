//! Error types for content resolution and rendering

use thiserror::Error;

/// Errors raised while resolving documents from the content store
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Document slug must not be empty")]
    InvalidSlug,

    #[error("No document {slug:?} in collection {collection:?}")]
    NotFound { collection: String, slug: String },

    #[error("Invalid front-matter in {path}: {message}")]
    FrontMatter { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the rendering pipeline
#[derive(Error, Debug)]
pub enum RenderError {
    /// A `pre` element without the `code > text` shape fenced code produces
    #[error("Malformed code block: {0}")]
    MalformedCodeBlock(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Errors surfaced while rendering a page of the site
#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl SiteError {
    /// Whether this error should be answered with a 404 page
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SiteError::Content(ContentError::NotFound { .. } | ContentError::InvalidSlug)
        )
    }
}

impl From<tera::Error> for SiteError {
    fn from(e: tera::Error) -> Self {
        SiteError::Render(RenderError::Template(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err: SiteError = ContentError::NotFound {
            collection: "posts".to_string(),
            slug: "missing".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(SiteError::from(ContentError::InvalidSlug).is_not_found());

        let err: SiteError = RenderError::MalformedCodeBlock("pre".to_string()).into();
        assert!(!err.is_not_found());
    }
}
