//! Document model and field projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Post author as stored by the CMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// A single content entry loaded from the store
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Stable unique key, also used in the route path
    pub slug: String,

    pub title: String,

    pub description: String,

    /// Publication timestamp; `None` when the front-matter has no usable date
    pub published_at: Option<DateTime<Utc>>,

    pub author: Option<Author>,

    /// Raw markdown body (front-matter stripped)
    pub content: String,

    pub cover_image: Option<String>,

    /// Whether the CMS marked this document as published
    pub published: bool,

    /// Full source file path
    pub source: PathBuf,
}

/// Fields a caller can request from the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    PublishedAt,
    Description,
    Slug,
    Author,
    Content,
    CoverImage,
}

impl Field {
    /// Every field, as the detail route requests them
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::PublishedAt,
        Field::Description,
        Field::Slug,
        Field::Author,
        Field::Content,
        Field::CoverImage,
    ];

    /// The fields a listing card needs
    pub const LISTING: [Field; 4] = [
        Field::Title,
        Field::Description,
        Field::PublishedAt,
        Field::Slug,
    ];
}

/// A document projected onto a requested field set.
/// Fields that were not requested are always `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentFields {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<Author>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
}

impl Document {
    /// Project this document onto `fields`
    pub fn select(&self, fields: &[Field]) -> DocumentFields {
        let mut out = DocumentFields::default();
        for field in fields {
            match field {
                Field::Slug => out.slug = Some(self.slug.clone()),
                Field::Title => out.title = Some(self.title.clone()),
                Field::Description => out.description = Some(self.description.clone()),
                Field::PublishedAt => out.published_at = self.published_at,
                Field::Author => out.author = self.author.clone(),
                Field::Content => out.content = Some(self.content.clone()),
                Field::CoverImage => out.cover_image = self.cover_image.clone(),
            }
        }
        out
    }
}
