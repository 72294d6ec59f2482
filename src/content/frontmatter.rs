//! Front-matter parsing for CMS documents

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::document::Author;

/// Custom deserializer that accepts either an author map or a bare name
fn author_or_name<'de, D>(deserializer: D) -> Result<Option<Author>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, MapAccess, Visitor};
    use std::fmt;

    struct AuthorOrName;

    impl<'de> Visitor<'de> for AuthorOrName {
        type Value = Option<Author>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an author name or a map with name and picture")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Author {
                name: value.to_string(),
                picture: None,
            }))
        }

        fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let author = Author::deserialize(de::value::MapAccessDeserializer::new(map))?;
            Ok(Some(author))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(AuthorOrName)
}

/// Front-matter data written by the CMS
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "author_or_name")]
    pub author: Option<Author>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub published_at: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading thematic break followed by prose is not front-matter.
        // Real front-matter has at least one `key: value` line.
        let has_yaml_structure = yaml_content.lines().any(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return false;
            }
            if let Some(colon_pos) = trimmed.find(':') {
                let before_colon = &trimmed[..colon_pos];
                let is_valid_key = !before_colon.is_empty()
                    && before_colon
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                    && before_colon != "http"
                    && before_colon != "https"
                    && before_colon != "ftp";
                if is_valid_key {
                    let after_colon = &trimmed[colon_pos + 1..];
                    return after_colon.is_empty() || after_colon.starts_with(' ');
                }
            }
            false
        });

        if !has_yaml_structure {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)?;
        Ok((fm, remaining))
    }

    /// Parse the publication date into a UTC timestamp
    pub fn parse_published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_date_string)
    }

    /// Documents without a status are treated as published
    pub fn is_published(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("published"))
            .unwrap_or(true)
    }
}

/// Parse a date string in various formats. Timestamps without an offset are UTC.
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cms_frontmatter() {
        let content = r#"---
title: 'Using GraphQL fragments'
status: 'published'
author:
  name: 'Elizabeth Alcalá'
  picture: 'https://avatars.githubusercontent.com/u/1?v=4'
slug: 'graphql-fragments'
description: 'How fragments keep queries tidy.'
coverImage: '/images/fragments.png'
publishedAt: '2023-03-07T01:59:39.000Z'
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Using GraphQL fragments"));
        assert_eq!(fm.slug.as_deref(), Some("graphql-fragments"));
        assert_eq!(fm.cover_image.as_deref(), Some("/images/fragments.png"));
        let author = fm.author.as_ref().unwrap();
        assert_eq!(author.name, "Elizabeth Alcalá");
        assert!(author.picture.is_some());
        assert!(fm.is_published());
        let date = fm.parse_published_at().unwrap();
        assert_eq!(date.format("%Y-%m-%d %H:%M").to_string(), "2023-03-07 01:59");
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_author_as_plain_name() {
        let content = "---\ntitle: Short\nauthor: Jane\nstatus: draft\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.author.as_ref().unwrap().name, "Jane");
        assert!(!fm.is_published());
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("Just text.\n").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.is_published());
        assert_eq!(remaining, "Just text.\n");
    }

    #[test]
    fn test_thematic_break_not_yaml() {
        let content = r#"
---

Check out https://example.com/path and http://test.com

---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nBody\n";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let a = parse_date_string("2024-01-15 10:30:00").unwrap();
        assert_eq!(a.format("%Y-%m-%dT%H:%M").to_string(), "2024-01-15T10:30");
        let b = parse_date_string("2024/01/15").unwrap();
        assert_eq!(b.format("%Y-%m-%d").to_string(), "2024-01-15");
        let c = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(c.format("%H:%M").to_string(), "08:30");
        assert!(parse_date_string("yesterday").is_none());
    }
}
