//! Document resolution on top of a content store

use std::cmp::Ordering;

use super::document::{DocumentFields, Field};
use super::store::ContentStore;
use crate::error::ContentError;

/// Resolve one document, turning absence into `ContentError::NotFound`
pub fn resolve<S: ContentStore + ?Sized>(
    store: &S,
    collection: &str,
    slug: &str,
    fields: &[Field],
) -> Result<DocumentFields, ContentError> {
    if slug.trim().is_empty() {
        return Err(ContentError::InvalidSlug);
    }

    store
        .document_by_slug(collection, slug, fields)?
        .ok_or_else(|| ContentError::NotFound {
            collection: collection.to_string(),
            slug: slug.to_string(),
        })
}

/// List documents newest first, optionally keeping only the first `limit`
///
/// `PublishedAt` is always fetched so the ordering can be applied, even when
/// the caller did not ask for it.
pub fn list_latest<S: ContentStore + ?Sized>(
    store: &S,
    collection: &str,
    fields: &[Field],
    limit: Option<usize>,
) -> Result<Vec<DocumentFields>, ContentError> {
    let mut fields = fields.to_vec();
    if !fields.contains(&Field::PublishedAt) {
        fields.push(Field::PublishedAt);
    }

    let mut documents = store.documents(collection, &fields)?;
    sort_newest_first(&mut documents);

    if let Some(limit) = limit {
        documents.truncate(limit);
    }

    Ok(documents)
}

/// Stable sort by publication timestamp, descending; undated documents go last
pub fn sort_newest_first(documents: &mut [DocumentFields]) {
    documents.sort_by(|a, b| match (&a.published_at, &b.published_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
