//! Page rendering: resolved routes to HTML documents

use anyhow::Result;
use tera::Context;

use super::{PostDocument, SiteData, TemplateRenderer};
use crate::content::Post;
use crate::site::{Resolved, Site};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Found,
    NotFound,
}

/// A rendered document and whether the path resolved
#[derive(Debug, Clone)]
pub struct Rendered {
    pub status: RenderStatus,
    pub html: String,
}

impl Rendered {
    pub fn is_found(&self) -> bool {
        self.status == RenderStatus::Found
    }
}

/// Renders site pages with the embedded templates
pub struct PageRenderer {
    templates: TemplateRenderer,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
        })
    }

    /// Render whatever `path` resolves to, falling back to the 404 page
    pub fn render_path(&self, site: &Site, path: &str) -> Result<Rendered> {
        let (status, html) = match site.resolve(path) {
            Resolved::Home => (RenderStatus::Found, self.render_home(site)?),
            Resolved::Post(post) => (RenderStatus::Found, self.render_post(site, post)?),
            Resolved::Tag { name, posts } => {
                (RenderStatus::Found, self.render_tag(site, name, &posts)?)
            }
            Resolved::NotFound => {
                tracing::debug!("No route for {}", path);
                (RenderStatus::NotFound, self.render_not_found(site, path)?)
            }
        };
        Ok(Rendered { status, html })
    }

    /// Post listing in store order
    pub fn render_home(&self, site: &Site) -> Result<String> {
        let posts: Vec<PostDocument> = site
            .posts()
            .iter()
            .map(|p| PostDocument::new(&site.config, p))
            .collect();

        let mut context = self.base_context(site, None, Some(site.config.description.as_str()));
        context.insert("posts", &posts);
        self.templates.render("index.html", &context)
    }

    pub fn render_post(&self, site: &Site, post: &Post) -> Result<String> {
        let document = PostDocument::new(&site.config, post);

        let mut context = self.base_context(site, Some(post.title.as_str()), document.description);
        context.insert("post", &document);
        self.templates.render("post.html", &context)
    }

    pub fn render_tag(&self, site: &Site, tag: &str, posts: &[&Post]) -> Result<String> {
        let posts: Vec<PostDocument> = posts
            .iter()
            .map(|p| PostDocument::new(&site.config, p))
            .collect();

        let mut context = self.base_context(site, Some(tag), None);
        context.insert("tag", tag);
        context.insert("posts", &posts);
        self.templates.render("tag.html", &context)
    }

    pub fn render_not_found(&self, site: &Site, path: &str) -> Result<String> {
        let mut context = self.base_context(site, Some("Page not found"), None);
        context.insert("path", path);
        self.templates.render("404.html", &context)
    }

    fn base_context(
        &self,
        site: &Site,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::new(&site.config));
        context.insert("page_title", &title);
        context.insert("page_description", &description.filter(|d| !d.is_empty()));
        context
    }
}
