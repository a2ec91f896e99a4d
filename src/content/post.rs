//! Post model

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

use super::{ReadingTime, SlugPath};

/// A published article
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Stable identifier: source path relative to the content directory
    pub id: String,

    /// Post title
    pub title: String,

    /// Optional summary
    pub description: Option<String>,

    /// URL path segments
    pub slug: SlugPath,

    /// Post tags, in front-matter order
    pub tags: Vec<String>,

    /// Publication date
    pub date: Option<DateTime<Local>>,

    /// Raw markdown body (front-matter removed)
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    pub reading_time: ReadingTime,

    /// Drafts are only loaded when `render_drafts` is set
    pub draft: bool,

    /// Source file path (relative)
    pub source: PathBuf,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,
}

impl Post {
    /// URL path of this post, e.g. `/posts/hello-world`
    pub fn route(&self) -> String {
        self.slug.to_route()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
