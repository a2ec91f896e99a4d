//! Data structures for template context

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;
use super::STYLESHEET_PATH;
use crate::helpers::{post_url, route_url, tag_url, url_for};

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub home_url: String,
    pub stylesheet: String,
    pub menu: Vec<MenuItem>,
}

impl SiteData {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            home_url: url_for(config, "/"),
            stylesheet: url_for(config, STYLESHEET_PATH),
            menu: config
                .menu
                .iter()
                .map(|link| MenuItem {
                    name: link.name.clone(),
                    url: if is_external(&link.path) {
                        link.path.clone()
                    } else {
                        route_url(config, &link.path)
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

/// The displayable document of one post.
///
/// Title, description, tags and body are borrowed from the post unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct PostDocument<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub reading_time: &'a str,
    pub date: Option<String>,
    pub date_iso: Option<String>,
    pub tags: Vec<TagLink>,
    pub url: String,
    pub body: &'a str,
}

impl<'a> PostDocument<'a> {
    pub fn new(config: &SiteConfig, post: &'a Post) -> Self {
        Self {
            title: &post.title,
            description: post.description.as_deref(),
            reading_time: &post.reading_time.text,
            date: post.date.map(|d| d.format("%B %-d, %Y").to_string()),
            date_iso: post.date.map(|d| d.to_rfc3339()),
            tags: post
                .tags
                .iter()
                .map(|tag| TagLink {
                    name: tag.clone(),
                    url: tag_url(config, tag),
                })
                .collect(),
            url: post_url(config, post),
            body: &post.content,
        }
    }

    /// Tag names in display order
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}
