//! Generator module - writes a site snapshot to static files
//!
//! Every route becomes `<public_dir>/<route>/index.html`, alongside a rendered
//! `404.html` and a `routes.json` manifest. The default stylesheet is written
//! first and static assets copied over it, so a site can replace it; generated
//! pages are written last and win over an asset at the same path.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::loader::is_content_file;
use crate::helpers::{encode_route, full_url_for};
use crate::routes::Route;
use crate::site::Site;
use crate::templates::{PageRenderer, STYLESHEET, STYLESHEET_PATH};
use crate::Blog;

/// Name of the route manifest written next to the pages
pub const MANIFEST_FILE: &str = "routes.json";

/// Static site generator using the embedded templates
pub struct Generator {
    blog: Blog,
    renderer: PageRenderer,
}

/// One line of the route manifest
#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    path: &'a str,
    url: String,
    kind: &'static str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: PageRenderer::new()?,
        })
    }

    /// Generate the entire site. Returns the number of pages written.
    pub fn generate(&self, site: &Site) -> Result<usize> {
        fs::create_dir_all(&self.blog.public_dir)?;

        write_file(&self.blog.public_dir.join(STYLESHEET_PATH), STYLESHEET)?;
        let assets = self.copy_static_assets()? + self.copy_source_assets()?;
        tracing::debug!("Copied {} assets", assets);

        let mut written = 0;
        for (path, route) in site.routes.iter() {
            let html = match route {
                Route::Home => self.renderer.render_home(site)?,
                Route::Post { index } => match site.store.get(*index) {
                    Some(post) => self.renderer.render_post(site, post)?,
                    None => continue,
                },
                Route::Tag { name } => {
                    let posts = site.posts_for_tag(name);
                    self.renderer.render_tag(site, name, &posts)?
                }
            };

            let output_path = self.output_path(path);
            write_file(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);
            written += 1;
        }

        let not_found = self.renderer.render_not_found(site, "")?;
        write_file(&self.blog.public_dir.join("404.html"), &not_found)?;

        self.generate_manifest(site)?;

        tracing::info!(
            "Generated {} pages into {:?}",
            written,
            self.blog.public_dir
        );
        Ok(written)
    }

    /// Output file of a root-relative route path
    pub fn output_path(&self, route: &str) -> PathBuf {
        let mut path = self.blog.public_dir.clone();
        for segment in route.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.join("index.html")
    }

    fn generate_manifest(&self, site: &Site) -> Result<()> {
        let config = &site.config;
        let entries: Vec<ManifestEntry> = site
            .routes
            .iter()
            .map(|(path, route)| {
                let url = full_url_for(config, &encode_route(path));
                match route {
                    Route::Home => ManifestEntry {
                        path,
                        url,
                        kind: "home",
                        title: &config.title,
                        source: None,
                    },
                    Route::Post { index } => {
                        let post = site.store.get(*index);
                        ManifestEntry {
                            path,
                            url,
                            kind: "post",
                            title: post.map(|p| p.title.as_str()).unwrap_or_default(),
                            source: post.map(|p| p.id.clone()),
                        }
                    }
                    Route::Tag { name } => ManifestEntry {
                        path,
                        url,
                        kind: "tag",
                        title: name,
                        source: None,
                    },
                }
            })
            .collect();

        let output_path = self.blog.public_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&output_path, json)?;
        tracing::debug!("Generated {}", MANIFEST_FILE);

        Ok(())
    }

    /// Copy the static directory verbatim
    fn copy_static_assets(&self) -> Result<usize> {
        if !self.blog.static_dir.is_dir() {
            return Ok(0);
        }
        copy_tree(&self.blog.static_dir, &self.blog.public_dir, |_| true)
    }

    /// Copy non-content files (images, etc.) that live next to posts
    fn copy_source_assets(&self) -> Result<usize> {
        if !self.blog.source_dir.is_dir() {
            return Ok(0);
        }
        copy_tree(&self.blog.source_dir, &self.blog.public_dir, |path| {
            !is_content_file(path)
        })
    }
}

/// Copy every visible file under `from` into `to`, keeping relative paths
fn copy_tree(from: &Path, to: &Path, include: impl Fn(&Path) -> bool) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(from)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !include(path) {
            continue;
        }

        let relative = path.strip_prefix(from)?;
        let dest = to.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
        copied += 1;
    }

    Ok(copied)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .map(|s| s.starts_with('.') || s.starts_with('_'))
        .unwrap_or(false)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn blog_with_posts() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "content/posts/hello-world.md",
            "---\ntitle: Hello World\ntags: [intro, news]\n---\n\nFirst post.\n",
        );
        write(
            dir.path(),
            "content/posts/second.md",
            "---\ntitle: Second\ntags: news\n---\n\nSecond post.\n",
        );
        write(dir.path(), "content/posts/diagram.png", "png");
        write(dir.path(), "static/css/style.css", "body {}");
        write(dir.path(), "static/.secret", "hidden");

        let blog = Blog::new(dir.path()).unwrap();
        (dir, blog)
    }

    #[test]
    fn test_generate_writes_every_route() {
        let (_dir, blog) = blog_with_posts();
        let site = blog.build().unwrap();
        let generator = Generator::new(&blog).unwrap();

        let written = generator.generate(&site).unwrap();
        assert_eq!(written, site.routes.len());

        let public = &blog.public_dir;
        for rel in [
            "index.html",
            "posts/hello-world/index.html",
            "posts/second/index.html",
            "tag/intro/index.html",
            "tag/news/index.html",
            "404.html",
            "routes.json",
        ] {
            assert!(public.join(rel).is_file(), "missing {}", rel);
        }

        let post = fs::read_to_string(public.join("posts/hello-world/index.html")).unwrap();
        assert!(post.contains("Hello World"));
        assert!(post.contains("First post."));
    }

    #[test]
    fn test_generate_copies_assets() {
        let (_dir, blog) = blog_with_posts();
        let site = blog.build().unwrap();
        Generator::new(&blog).unwrap().generate(&site).unwrap();

        let public = &blog.public_dir;
        assert_eq!(
            fs::read_to_string(public.join("css/style.css")).unwrap(),
            "body {}"
        );
        assert!(public.join("posts/diagram.png").is_file());
        assert!(!public.join(".secret").exists());
        assert!(!public.join("posts/hello-world.md").exists());
    }

    #[test]
    fn test_manifest_lists_routes_in_order() {
        let (_dir, blog) = blog_with_posts();
        let site = blog.build().unwrap();
        Generator::new(&blog).unwrap().generate(&site).unwrap();

        let json = fs::read_to_string(blog.public_dir.join(MANIFEST_FILE)).unwrap();
        let entries: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        let paths: Vec<&str> = entries
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert_eq!(
            paths,
            [
                "/",
                "/posts/hello-world",
                "/posts/second",
                "/tag/intro",
                "/tag/news"
            ]
        );
        assert_eq!(entries[1]["kind"], "post");
        assert_eq!(entries[1]["source"], "posts/hello-world.md");
        assert_eq!(entries[4]["title"], "news");
    }

    #[test]
    fn test_output_path() {
        let (_dir, blog) = blog_with_posts();
        let generator = Generator::new(&blog).unwrap();
        assert_eq!(
            generator.output_path("/"),
            blog.public_dir.join("index.html")
        );
        assert_eq!(
            generator.output_path("/tag/big news"),
            blog.public_dir.join("tag").join("big news").join("index.html")
        );
    }
}
