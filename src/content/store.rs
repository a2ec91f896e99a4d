//! The content store: every post of one build, immutable after loading

use std::collections::HashMap;

use super::loader::ContentLoader;
use super::{Post, SlugPath};
use crate::error::{ContentError, Result};
use crate::Blog;

/// All posts of a build, in source listing order
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Vec<Post>,
    by_slug: HashMap<SlugPath, usize>,
}

impl ContentStore {
    /// Load and validate every post of a blog
    pub fn load_all(blog: &Blog) -> Result<Self> {
        let posts = ContentLoader::new(blog).load_posts()?;
        Self::from_posts(posts)
    }

    /// Index already loaded posts, rejecting slug collisions
    pub fn from_posts(posts: Vec<Post>) -> Result<Self> {
        let mut by_slug: HashMap<SlugPath, usize> = HashMap::with_capacity(posts.len());

        for (i, post) in posts.iter().enumerate() {
            if let Some(&first) = by_slug.get(&post.slug) {
                return Err(ContentError::DuplicateSlug {
                    slug: post.slug.to_string(),
                    first: posts[first].source.clone(),
                    second: post.source.clone(),
                });
            }
            by_slug.insert(post.slug.clone(), i);
        }

        Ok(Self { posts, by_slug })
    }

    /// Look up a post; `None` means the caller should answer "not found"
    pub fn find_by_slug(&self, slug: &SlugPath) -> Option<&Post> {
        self.position(slug).map(|i| &self.posts[i])
    }

    /// Index of a post in store order
    pub fn position(&self, slug: &SlugPath) -> Option<usize> {
        self.by_slug.get(slug).copied()
    }

    pub fn get(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContentStore {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
