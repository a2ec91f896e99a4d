//! Tag index
//!
//! Tags are kept in first-seen order while scanning posts in store order,
//! and each tag remembers which posts carry it. Matching is case-sensitive:
//! "News" and "news" are two different tags.

use indexmap::IndexMap;
use serde::Serialize;

use super::{ContentStore, Post};

/// Distinct tags and the posts carrying each one
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: IndexMap<String, Vec<usize>>,
}

/// A tag together with its posts, derived on demand
#[derive(Debug, Clone, Serialize)]
pub struct TagEntry<'a> {
    pub name: &'a str,
    pub posts: Vec<&'a Post>,
}

impl TagIndex {
    pub fn build(store: &ContentStore) -> Self {
        let mut tags: IndexMap<String, Vec<usize>> = IndexMap::new();

        for (i, post) in store.iter().enumerate() {
            for tag in &post.tags {
                tags.entry(tag.clone()).or_default().push(i);
            }
        }

        Self { tags }
    }

    /// Distinct tags in first-seen order
    pub fn distinct_tags(&self) -> Vec<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    /// Posts carrying `tag` in store order; empty for unknown tags
    pub fn posts_for_tag<'a>(&self, store: &'a ContentStore, tag: &str) -> Vec<&'a Post> {
        self.tags
            .get(tag)
            .map(|indices| indices.iter().filter_map(|&i| store.get(i)).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of posts carrying `tag`
    pub fn count(&self, tag: &str) -> usize {
        self.tags.get(tag).map_or(0, Vec::len)
    }

    pub fn entries<'a>(&'a self, store: &'a ContentStore) -> Vec<TagEntry<'a>> {
        self.tags
            .keys()
            .map(|name| TagEntry {
                name,
                posts: self.posts_for_tag(store, name),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
