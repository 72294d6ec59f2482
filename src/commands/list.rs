//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::content::{list_latest, ContentStore, Field, FileStore};
use crate::Folio;

#[derive(Debug, Serialize)]
struct ListedPost {
    slug: String,
    title: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// List site content by type, as text or JSON
pub fn run(folio: &Folio, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(folio, content_type, json)?);
    Ok(())
}

/// Build the listing output for one content type
pub fn render(folio: &Folio, content_type: &str, json: bool) -> Result<String> {
    let store = FileStore::for_site(folio);
    let collection = &folio.config.collection;
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts: Vec<ListedPost> = list_latest(&store, collection, &Field::LISTING, None)?
                .into_iter()
                .map(|doc| ListedPost {
                    slug: doc.slug.unwrap_or_default(),
                    title: doc.title.unwrap_or_default(),
                    published_at: doc.published_at.map(|d| d.to_rfc3339()),
                })
                .collect();

            if json {
                out.push_str(&serde_json::to_string_pretty(&posts)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Posts ({}):\n", posts.len()));
                for post in posts {
                    let date = post
                        .published_at
                        .as_deref()
                        .and_then(|d| d.get(..10))
                        .unwrap_or("----------");
                    out.push_str(&format!("  {} - {} [{}]\n", date, post.title, post.slug));
                }
            }
        }
        "slug" | "slugs" => {
            let slugs = store.document_slugs(collection)?;
            if json {
                out.push_str(&serde_json::to_string_pretty(&slugs)?);
                out.push('\n');
            } else {
                for slug in slugs {
                    out.push_str(&slug);
                    out.push('\n');
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, slug", content_type);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folio() -> (TempDir, Folio) {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("outstatic/content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("old.md"),
            "---\ntitle: Old\npublishedAt: '2022-05-01T00:00:00.000Z'\n---\n",
        )
        .unwrap();
        fs::write(
            posts.join("new.md"),
            "---\ntitle: New\npublishedAt: '2023-05-01T00:00:00.000Z'\n---\n",
        )
        .unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        (tmp, folio)
    }

    #[test]
    fn test_list_posts_newest_first() {
        let (_tmp, folio) = folio();
        let text = render(&folio, "posts", false).unwrap();
        assert_eq!(
            text,
            "Posts (2):\n  2023-05-01 - New [new]\n  2022-05-01 - Old [old]\n"
        );

        let json: serde_json::Value =
            serde_json::from_str(&render(&folio, "post", true).unwrap()).unwrap();
        assert_eq!(json[0]["slug"], "new");
        assert_eq!(json[1]["publishedAt"], "2022-05-01T00:00:00+00:00");
    }

    #[test]
    fn test_list_slugs_and_unknown_type() {
        let (_tmp, folio) = folio();
        assert_eq!(render(&folio, "slugs", false).unwrap(), "new\nold\n");
        assert!(render(&folio, "tags", false).is_err());
    }
}
