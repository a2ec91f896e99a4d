//! Route table: every statically reachable URL path of a build
//!
//! Routes are enumerated as the home page, then one route per post in store
//! order, then one route per distinct tag in first-seen order. Paths are
//! root-relative (the configured `root` is applied only when linking).

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{ContentStore, TagIndex};
use crate::error::{ContentError, Result};

/// A reachable page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Route {
    /// The post listing at `/`
    Home,
    /// A post, by its index in the content store
    Post { index: usize },
    /// A tag listing
    Tag { name: String },
}

/// Ordered map from URL path to route
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<String, Route>,
}

impl RouteTable {
    /// Enumerate all routes, failing on any two that share a path
    pub fn build(config: &SiteConfig, store: &ContentStore, tags: &TagIndex) -> Result<Self> {
        let mut routes: IndexMap<String, Route> = IndexMap::new();
        routes.insert("/".to_string(), Route::Home);

        for (index, post) in store.iter().enumerate() {
            let path = post.route();
            if let Some(existing) = routes.get(&path) {
                return Err(ContentError::RouteConflict {
                    route: path,
                    path: post.source.clone(),
                    other: describe(existing, store),
                });
            }
            routes.insert(path, Route::Post { index });
        }

        for name in tags.distinct_tags() {
            let path = tag_path(config, name);
            if let Some(existing) = routes.get(&path) {
                let culprit = match existing {
                    Route::Post { index } => store
                        .get(*index)
                        .map(|p| p.source.clone())
                        .unwrap_or_default(),
                    _ => config.source_dir.clone().into(),
                };
                return Err(ContentError::RouteConflict {
                    route: path,
                    path: culprit,
                    other: format!("tag page '{}'", name),
                });
            }
            routes.insert(
                path,
                Route::Tag {
                    name: name.to_string(),
                },
            );
        }

        tracing::debug!("Enumerated {} routes", routes.len());
        Ok(Self { routes })
    }

    /// Find the route for a request path; `None` means not found.
    ///
    /// The exact path wins; a trailing `index.html` is only dropped when the
    /// exact path is not a route, so a tag named `index.html` stays reachable.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);
        if let Some(route) = self.routes.get(&path) {
            return Some(route);
        }
        let parent = path.strip_suffix("/index.html")?;
        let parent = if parent.is_empty() { "/" } else { parent };
        self.routes.get(parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(path, route)| (path.as_str(), route))
    }

    pub fn paths(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Root-relative path of a tag listing, e.g. `/tag/news`
pub fn tag_path(config: &SiteConfig, tag: &str) -> String {
    let prefix = config.tag_prefix();
    if prefix.is_empty() {
        format!("/{}", tag)
    } else {
        format!("/{}/{}", prefix, tag)
    }
}

/// Decode and canonicalize a request path: `//posts/a%20b/` -> `/posts/a b`
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn describe(route: &Route, store: &ContentStore) -> String {
    match route {
        Route::Home => "the home page".to_string(),
        Route::Post { index } => store
            .get(*index)
            .map(|p| p.source.display().to_string())
            .unwrap_or_else(|| "a post".to_string()),
        Route::Tag { name } => format!("tag page '{}'", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_post;
    use std::path::Path;

    fn build(posts: Vec<crate::content::Post>) -> Result<RouteTable> {
        let store = ContentStore::from_posts(posts)?;
        let tags = TagIndex::build(&store);
        RouteTable::build(&SiteConfig::default(), &store, &tags)
    }

    #[test]
    fn test_enumerates_home_posts_then_tags() {
        let table = build(vec![
            test_post("posts/hello-world.md", "A", &["intro", "news"]),
            test_post("posts/second.md", "B", &["news"]),
        ])
        .unwrap();

        assert_eq!(
            table.paths(),
            [
                "/",
                "/posts/hello-world",
                "/posts/second",
                "/tag/intro",
                "/tag/news"
            ]
        );
    }

    #[test]
    fn test_resolve() {
        let table = build(vec![test_post("posts/hello-world.md", "A", &["big news"])]).unwrap();

        assert_eq!(table.resolve("/"), Some(&Route::Home));
        assert_eq!(
            table.resolve("/posts/hello-world/"),
            Some(&Route::Post { index: 0 })
        );
        assert_eq!(
            table.resolve("posts/hello-world/index.html"),
            Some(&Route::Post { index: 0 })
        );
        assert_eq!(
            table.resolve("/tag/big%20news"),
            Some(&Route::Tag {
                name: "big news".to_string()
            })
        );
        assert_eq!(table.resolve("/posts/does-not-exist"), None);
    }

    #[test]
    fn test_root_index_conflicts_with_home() {
        let err = build(vec![test_post("index.md", "Root", &[])]).unwrap_err();
        match err {
            ContentError::RouteConflict { route, path, other } => {
                assert_eq!(route, "/");
                assert_eq!(path, Path::new("index.md"));
                assert_eq!(other, "the home page");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_post_shadowing_tag_page_conflicts() {
        let err = build(vec![
            test_post("posts/a.md", "A", &["rust"]),
            test_post("tag/rust.md", "Rust", &[]),
        ])
        .unwrap_err();
        assert_eq!(err.path(), Path::new("tag/rust.md"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("//posts//a/"), "/posts/a");
        assert_eq!(normalize("/posts/a?ref=home"), "/posts/a");
        assert_eq!(normalize("/posts/a/index.html"), "/posts/a/index.html");
    }

    #[test]
    fn test_index_html_named_routes_resolve() {
        let table = build(vec![
            test_post("posts/a.md", "A", &["index.html"]),
            test_post("posts/index.html.md", "B", &[]),
        ])
        .unwrap();

        assert_eq!(
            table.resolve("/tag/index.html"),
            Some(&Route::Tag {
                name: "index.html".to_string()
            })
        );
        assert_eq!(
            table.resolve("/posts/index.html"),
            Some(&Route::Post { index: 1 })
        );
        assert_eq!(
            table.resolve("/posts/a/index.html"),
            Some(&Route::Post { index: 0 })
        );
        assert_eq!(table.resolve("/index.html"), Some(&Route::Home));
        assert!(table.resolve("/tag/index.html/index.html").is_some());
    }
}
