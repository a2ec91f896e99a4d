//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::routes::Route;
use crate::site::Site;
use crate::Blog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Post,
    Tag,
    Route,
}

/// Print a listing of the built site
pub fn run(blog: &Blog, kind: ListKind) -> Result<()> {
    let site = Site::build(blog)?;
    print!("{}", render(&site, kind));
    Ok(())
}

/// Format a listing, one entry per line
pub fn render(site: &Site, kind: ListKind) -> String {
    let mut out = String::new();

    match kind {
        ListKind::Post => {
            let _ = writeln!(out, "Posts ({}):", site.posts().len());
            for post in site.posts() {
                let date = post
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                let _ = writeln!(
                    out,
                    "  {} - {} [{}] ({})",
                    date, post.title, post.id, post.reading_time.text
                );
            }
        }
        ListKind::Tag => {
            let _ = writeln!(out, "Tags ({}):", site.tags.len());
            for tag in site.distinct_tags() {
                let _ = writeln!(out, "  {} ({})", tag, site.tags.count(tag));
            }
        }
        ListKind::Route => {
            let _ = writeln!(out, "Routes ({}):", site.routes.len());
            for (path, route) in site.routes.iter() {
                let target = match route {
                    Route::Home => "home".to_string(),
                    Route::Post { index } => site
                        .store
                        .get(*index)
                        .map(|p| p.id.clone())
                        .unwrap_or_default(),
                    Route::Tag { name } => format!("tag: {}", name),
                };
                let _ = writeln!(out, "  {:<32} {}", path, target);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{test_post, ContentStore};

    fn site() -> Site {
        let store = ContentStore::from_posts(vec![
            test_post("posts/hello-world.md", "A", &["intro", "news"]),
            test_post("posts/second.md", "B", &["news"]),
        ])
        .unwrap();
        Site::from_store(SiteConfig::default(), store).unwrap()
    }

    #[test]
    fn test_list_tags_with_counts() {
        let out = render(&site(), ListKind::Tag);
        assert_eq!(out, "Tags (2):\n  intro (1)\n  news (2)\n");
    }

    #[test]
    fn test_list_routes() {
        let out = render(&site(), ListKind::Route);
        assert!(out.starts_with("Routes (5):\n"));
        assert!(out.contains("posts/second.md"));
        assert!(out.contains("tag: news"));
    }

    #[test]
    fn test_list_posts() {
        let out = render(&site(), ListKind::Post);
        assert!(out.contains("A [posts/hello-world.md] (1 min read)"));
    }
}
