//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::SlugPath;
use crate::Blog;

/// Directory under the content root where new posts land
const POSTS_DIR: &str = "posts";

/// Create a new post from the default scaffold.
///
/// `path` overrides the file location (relative to the content directory,
/// without extension); otherwise the slugified title under `posts/` is used.
pub fn create_post(blog: &Blog, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("A post needs a title");
    }

    let relative = match path {
        Some(p) => PathBuf::from(format!("{}.md", p.trim_matches('/'))),
        None => {
            let slug = slug::slugify(title);
            if slug.is_empty() {
                anyhow::bail!("Cannot derive a file name from title {:?}", title);
            }
            Path::new(POSTS_DIR).join(format!("{}.md", slug))
        }
    };

    // Reject locations that would not produce a valid route
    SlugPath::from_source(&relative)
        .map_err(|msg| anyhow::anyhow!("Invalid post path {:?}: {}", relative, msg))?;

    let file_path = blog.source_dir.join(&relative);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let now = chrono::Local::now();
    let quoted_title = serde_yaml::to_string(title).context("Failed to encode title")?;
    let content = format!(
        "---\ntitle: {}\ndescription: ''\ndate: {}\ntags: []\n---\n\n",
        quoted_title.trim_end(),
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;

    #[test]
    fn test_create_post_from_title() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Hello: A New World", None).unwrap();
        assert_eq!(path, blog.source_dir.join("posts/hello-a-new-world.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&path, &content).unwrap();
        let meta = fm.into_meta(&path).unwrap();
        assert_eq!(meta.title, "Hello: A New World");
        assert_eq!(meta.description, None);
        assert!(meta.tags.is_empty());
        assert!(meta.date.is_some());
    }

    #[test]
    fn test_create_post_at_path() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "About", Some("about")).unwrap();
        assert_eq!(path, blog.source_dir.join("about.md"));
    }

    #[test]
    fn test_existing_post_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        create_post(&blog, "Twice", None).unwrap();
        assert!(create_post(&blog, "Twice", None).is_err());
    }

    #[test]
    fn test_escaping_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(create_post(&blog, "Escape", Some("../outside")).is_err());
    }
}
