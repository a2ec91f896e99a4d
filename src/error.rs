//! Build-time content errors
//!
//! Every variant is fatal for a build and names the source file that caused
//! it. A missing post or tag at request time is not an error; lookups return
//! `Option` and the renderer answers with a not-found page.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for content loading and route derivation
pub type Result<T> = std::result::Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    /// Malformed front-matter, missing required field, or invalid slug/tag
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Two posts resolve to the same slug
    #[error("Duplicate slug '{slug}': {second} collides with {first}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A post route shadows another route (home or a tag listing)
    #[error("Route conflict at '{route}': {path} collides with {other}")]
    RouteConflict {
        route: String,
        path: PathBuf,
        other: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The source file this error points at
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Parse { path, .. } => path,
            Self::DuplicateSlug { second, .. } => second,
            Self::RouteConflict { path, .. } => path,
            Self::Io { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_file() {
        let err = ContentError::parse("posts/broken.md", "missing required field `title`");
        let msg = err.to_string();
        assert!(msg.contains("posts/broken.md"));
        assert!(msg.contains("title"));
        assert_eq!(err.path(), std::path::Path::new("posts/broken.md"));
    }

    #[test]
    fn test_duplicate_slug_points_at_second_file() {
        let err = ContentError::DuplicateSlug {
            slug: "posts/hello".to_string(),
            first: PathBuf::from("posts/hello.md"),
            second: PathBuf::from("posts/hello/index.md"),
        };
        assert!(err.to_string().contains("posts/hello/index.md"));
        assert_eq!(err.path(), std::path::Path::new("posts/hello/index.md"));
    }
}
