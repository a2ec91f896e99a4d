//! Content module - handles posts, slugs, tags and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod reading_time;
mod slug;
mod store;
mod tags;

pub use frontmatter::{FrontMatter, PostMeta};
pub use markdown::{strip_mdx_esm, MarkdownRenderer};
pub use post::Post;
pub use reading_time::{count_words, ReadingTime, ReadingTimeEstimator};
pub use slug::SlugPath;
pub use store::ContentStore;
pub use tags::{TagEntry, TagIndex};

/// Build a post in memory, bypassing the filesystem
#[cfg(test)]
pub(crate) fn test_post(source: &str, title: &str, tags: &[&str]) -> Post {
    let source = std::path::PathBuf::from(source);
    let raw = format!("Body of {}", title);
    Post {
        id: source.to_string_lossy().replace('\\', "/"),
        title: title.to_string(),
        description: None,
        slug: SlugPath::from_source(&source).unwrap(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        date: None,
        content: format!("<p>{}</p>", raw),
        reading_time: ReadingTimeEstimator::new().estimate(&raw),
        raw,
        draft: false,
        full_source: source.clone(),
        source,
    }
}
