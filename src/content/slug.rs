//! Slug paths derived from source locations
//!
//! `posts/hello-world.md` becomes `["posts", "hello-world"]`, and
//! `posts/hello/index.mdx` collapses to `["posts", "hello"]`.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path};

/// Characters that may never appear inside a single segment
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '?', '#'];

/// Ordered URL path segments identifying a post
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SlugPath(Vec<String>);

impl SlugPath {
    /// Derive a slug from a source path relative to the content directory
    pub fn from_source(relative: &Path) -> Result<Self, String> {
        let without_ext = relative.with_extension("");
        let mut segments = Vec::new();

        for component in without_ext.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| format!("non UTF-8 path segment {:?}", part))?;
                    segments.push(part.to_string());
                }
                Component::CurDir => {}
                other => return Err(format!("unexpected path component {:?}", other)),
            }
        }

        if segments.last().map(String::as_str) == Some("index") {
            segments.pop();
        }

        Self::from_segments(segments)
    }

    /// Build from already split segments, validating each one
    pub fn from_segments<I, S>(segments: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            if segment.trim().is_empty() {
                return Err("empty path segment".to_string());
            }
            if segment.contains(FORBIDDEN_CHARS) || segment.chars().any(char::is_control) {
                return Err(format!("path segment '{}' is not URL-safe", segment));
            }
        }
        Ok(Self(segments))
    }

    /// Parse a request path such as `/posts/hello-world/`
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URL path with a leading slash, `/` for the empty slug
    pub fn to_route(&self) -> String {
        format!("/{}", self.0.join("/"))
    }
}

impl fmt::Display for SlugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl Serialize for SlugPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_extension() {
        let slug = SlugPath::from_source(Path::new("posts/hello-world.md")).unwrap();
        assert_eq!(slug.segments(), ["posts", "hello-world"]);
        assert_eq!(slug.to_route(), "/posts/hello-world");
        assert_eq!(slug.to_string(), "posts/hello-world");
    }

    #[test]
    fn test_collapses_index() {
        let slug = SlugPath::from_source(Path::new("posts/deep-dive/index.mdx")).unwrap();
        assert_eq!(slug.to_string(), "posts/deep-dive");

        let root = SlugPath::from_source(Path::new("index.md")).unwrap();
        assert!(root.is_empty());
        assert_eq!(root.to_route(), "/");
    }

    #[test]
    fn test_index_only_collapses_last_segment() {
        let slug = SlugPath::from_source(Path::new("index/notes.md")).unwrap();
        assert_eq!(slug.segments(), ["index", "notes"]);
    }

    #[test]
    fn test_rejects_unsafe_segments() {
        assert!(SlugPath::from_source(Path::new("posts/what?.md")).is_err());
        assert!(SlugPath::from_source(Path::new("posts/c#.md")).is_err());
        assert!(SlugPath::from_source(Path::new("../escape.md")).is_err());
    }

    #[test]
    fn test_parse_request_path() {
        let parsed = SlugPath::parse("/posts/hello-world/");
        let derived = SlugPath::from_source(Path::new("posts/hello-world.md")).unwrap();
        assert_eq!(parsed, derived);
        assert!(SlugPath::parse("/").is_empty());
    }
}
