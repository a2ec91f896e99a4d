//! Content loader - loads posts from the content directory

use std::fs;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

use super::{FrontMatter, MarkdownRenderer, Post, ReadingTimeEstimator, SlugPath};
use crate::error::{ContentError, Result};
use crate::Blog;

/// Extensions treated as post sources
const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
    estimator: ReadingTimeEstimator,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        let renderer = MarkdownRenderer::with_options(&blog.config.highlight);
        let estimator = ReadingTimeEstimator::from_config(&blog.config.reading_time);
        Self {
            blog,
            renderer,
            estimator,
        }
    }

    /// Load every post in source listing order.
    ///
    /// The first invalid file aborts the whole load.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", source_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source_dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                ContentError::io(path, source)
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !is_content_file(path) {
                continue;
            }

            let post = self.load_post(path)?;
            if post.draft && !self.blog.config.render_drafts {
                tracing::debug!("Skipping draft {:?}", post.source);
                continue;
            }
            posts.push(post);
        }

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), source_dir);
        Ok(posts)
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let source = path
            .strip_prefix(&self.blog.source_dir)
            .unwrap_or(path)
            .to_path_buf();

        let content = fs::read_to_string(path).map_err(|e| ContentError::io(&source, e))?;
        let (fm, body) = FrontMatter::parse(&source, &content)?;
        let meta = fm.into_meta(&source)?;

        let slug = SlugPath::from_source(&source).map_err(|msg| ContentError::parse(&source, msg))?;

        let is_mdx = path.extension().is_some_and(|e| e == "mdx");
        let (content_html, text) = if is_mdx {
            self.renderer.render_mdx(body)
        } else {
            (self.renderer.render(body), body.to_string())
        };
        let reading_time = self.estimator.estimate(&text);

        Ok(Post {
            id: source_id(&source),
            title: meta.title,
            description: meta.description,
            slug,
            tags: meta.tags,
            date: meta.date,
            raw: body.to_string(),
            content: content_html,
            reading_time,
            draft: meta.draft,
            source,
            full_source: path.to_path_buf(),
        })
    }
}

/// Check if a file is a markdown or MDX file
pub fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CONTENT_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Entries starting with `_` or `.` are never content
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('_') || s.starts_with('.'))
        .unwrap_or(false)
}

/// Source path with `/` separators on every platform
fn source_id(source: &Path) -> String {
    source
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
