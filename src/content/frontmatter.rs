//! Front-matter parsing
//!
//! Every post starts with a YAML block delimited by `---` lines. The block is
//! deserialized into [`FrontMatter`] and then validated into a typed
//! [`PostMeta`]; there is no partially-typed intermediate that escapes this
//! module.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ContentError, Result};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Raw front-matter block as written by the author
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub draft: bool,

    /// Keys this generator does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Validated post metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<DateTime<Local>>,
    pub draft: bool,
}

impl FrontMatter {
    /// Split `content` into its front-matter and body.
    /// Returns (front_matter, remaining_content)
    pub fn parse<'a>(path: &Path, content: &'a str) -> Result<(Self, &'a str)> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let Some(rest) = content.strip_prefix("---") else {
            return Err(ContentError::parse(path, "missing front-matter block"));
        };
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or_else(|| ContentError::parse(path, "front-matter must open with a '---' line"))?;

        let (yaml_content, remaining) = split_closing_fence(rest)
            .ok_or_else(|| ContentError::parse(path, "unterminated front-matter block"))?;

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml_content).map_err(|e| {
            ContentError::parse(path, format!("malformed front-matter: {}", e))
        })?;

        if !fm.extra.is_empty() {
            tracing::debug!(
                "Ignoring unknown front-matter keys in {:?}: {:?}",
                path,
                fm.extra.keys().collect::<Vec<_>>()
            );
        }

        Ok((fm, remaining))
    }

    /// Validate into typed metadata
    pub fn into_meta(self, path: &Path) -> Result<PostMeta> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            Some(_) => return Err(ContentError::parse(path, "field `title` is empty")),
            None => return Err(ContentError::parse(path, "missing required field `title`")),
        };

        let description = self.description.filter(|d| !d.trim().is_empty());

        let date = match self.date {
            Some(raw) => Some(parse_date_string(&raw).ok_or_else(|| {
                ContentError::parse(path, format!("unrecognized date '{}'", raw))
            })?),
            None => None,
        };

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if tag.is_empty() {
                tracing::warn!("Skipping empty tag in {:?}", path);
                continue;
            }
            if tag.contains(['/', '\\']) || tag == "." || tag == ".." {
                return Err(ContentError::parse(
                    path,
                    format!("tag '{}' cannot be used as a path segment", tag),
                ));
            }
            if tags.iter().any(|t| t == tag) {
                tracing::warn!("Dropping duplicate tag '{}' in {:?}", tag, path);
                continue;
            }
            tags.push(tag.to_string());
        }

        Ok(PostMeta {
            title,
            description,
            tags,
            date,
            draft: self.draft,
        })
    }
}

/// Find the closing `---` line, returning (yaml, body)
fn split_closing_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    None
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    // Try RFC 3339 / ISO 8601 first, it carries its own offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
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
            return dt.and_local_timezone(Local).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0)?.and_local_timezone(Local).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("posts/test.md")
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
description: First post
date: 2024-01-15 10:30:00
tags:
  - rust
  - intro
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(path(), content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.tags, vec!["rust", "intro"]);
        assert!(remaining.starts_with("This is the content."));

        let meta = fm.into_meta(path()).unwrap();
        assert_eq!(meta.description.as_deref(), Some("First post"));
        assert_eq!(
            meta.date.unwrap().format("%Y-%m-%d").to_string(),
            "2024-01-15"
        );
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntitle: Single Tag Post\ntags: Notes\n---\n\nContent here.\n";

        let (fm, _) = FrontMatter::parse(path(), content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_crlf_frontmatter() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, remaining) = FrontMatter::parse(path(), content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert!(remaining.starts_with("Body"));
    }

    #[test]
    fn test_missing_frontmatter_is_parse_error() {
        let err = FrontMatter::parse(path(), "# Just markdown\n").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(err.to_string().contains("posts/test.md"));
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let err = FrontMatter::parse(path(), "---\ntitle: Oops\n\nbody").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = FrontMatter::parse(path(), "---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(err.to_string().contains("malformed front-matter"));
    }

    #[test]
    fn test_missing_title() {
        let (fm, _) = FrontMatter::parse(path(), "---\ndescription: no title\n---\nbody").unwrap();
        let err = fm.into_meta(path()).unwrap_err();
        assert!(err.to_string().contains("missing required field `title`"));
    }

    #[test]
    fn test_empty_block_has_no_title() {
        let (fm, body) = FrontMatter::parse(path(), "---\n---\nbody").unwrap();
        assert_eq!(body, "body");
        assert!(fm.into_meta(path()).is_err());
    }

    #[test]
    fn test_tags_are_deduplicated_in_order() {
        let (fm, _) = FrontMatter::parse(
            path(),
            "---\ntitle: T\ntags: [news, intro, news, '  ', intro]\n---\n",
        )
        .unwrap();
        let meta = fm.into_meta(path()).unwrap();
        assert_eq!(meta.tags, vec!["news", "intro"]);
    }

    #[test]
    fn test_tag_with_separator_rejected() {
        let (fm, _) = FrontMatter::parse(path(), "---\ntitle: T\ntags: [a/b]\n---\n").unwrap();
        assert!(fm.into_meta(path()).is_err());
        let (fm, _) = FrontMatter::parse(path(), "---\ntitle: T\ntags: ['..']\n---\n").unwrap();
        assert!(fm.into_meta(path()).is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        let (fm, _) =
            FrontMatter::parse(path(), "---\ntitle: T\ndate: next tuesday\n---\n").unwrap();
        let err = fm.into_meta(path()).unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn test_blank_description_is_absent() {
        let (fm, _) = FrontMatter::parse(path(), "---\ntitle: T\ndescription: ''\n---\n").unwrap();
        assert_eq!(fm.into_meta(path()).unwrap().description, None);
    }

    #[test]
    fn test_unknown_keys_are_kept_aside() {
        let (fm, _) =
            FrontMatter::parse(path(), "---\ntitle: T\nlayout: wide\n---\n").unwrap();
        assert!(fm.extra.contains_key("layout"));
    }
}
