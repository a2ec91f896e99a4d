//! Immutable site snapshot
//!
//! A [`Site`] is built once per build: the content store is loaded and
//! validated, then the tag index and route table are derived from it.
//! Nothing in it is mutated afterwards, so it can be shared as `Arc<Site>`
//! across any number of concurrent readers.

use crate::config::SiteConfig;
use crate::content::{ContentStore, Post, SlugPath, TagIndex};
use crate::error::Result;
use crate::routes::{Route, RouteTable};
use crate::Blog;

#[derive(Debug, Clone)]
pub struct Site {
    pub config: SiteConfig,
    pub store: ContentStore,
    pub tags: TagIndex,
    pub routes: RouteTable,
}

/// What a request path resolves to
#[derive(Debug, Clone)]
pub enum Resolved<'a> {
    Home,
    Post(&'a Post),
    Tag {
        name: &'a str,
        posts: Vec<&'a Post>,
    },
    NotFound,
}

impl Site {
    /// Load every post and derive tags and routes
    pub fn build(blog: &Blog) -> Result<Self> {
        let store = ContentStore::load_all(blog)?;
        Self::from_store(blog.config.clone(), store)
    }

    pub fn from_store(config: SiteConfig, store: ContentStore) -> Result<Self> {
        let tags = TagIndex::build(&store);
        let routes = RouteTable::build(&config, &store, &tags)?;

        tracing::info!(
            "Loaded {} posts, {} tags, {} routes",
            store.len(),
            tags.len(),
            routes.len()
        );

        Ok(Self {
            config,
            store,
            tags,
            routes,
        })
    }

    pub fn find_by_slug(&self, slug: &SlugPath) -> Option<&Post> {
        self.store.find_by_slug(slug)
    }

    pub fn distinct_tags(&self) -> Vec<&str> {
        self.tags.distinct_tags()
    }

    pub fn posts_for_tag(&self, tag: &str) -> Vec<&Post> {
        self.tags.posts_for_tag(&self.store, tag)
    }

    pub fn posts(&self) -> &[Post] {
        self.store.posts()
    }

    /// Resolve a root-relative request path
    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        match self.routes.resolve(path) {
            Some(Route::Home) => Resolved::Home,
            Some(Route::Post { index }) => match self.store.get(*index) {
                Some(post) => Resolved::Post(post),
                None => Resolved::NotFound,
            },
            Some(Route::Tag { name }) => Resolved::Tag {
                name,
                posts: self.posts_for_tag(name),
            },
            None => Resolved::NotFound,
        }
    }
}
