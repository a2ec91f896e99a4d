//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::site::Site;
use crate::{Blog, CONFIG_FILE};

/// Build the site snapshot, then write it out.
///
/// Content is fully loaded and every route validated before the first file
/// is written, so a broken post leaves the previous output untouched.
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let site = Site::build(blog)?;
    let generator = Generator::new(blog)?;
    generator.generate(&site)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch for file changes and regenerate
pub fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&blog.source_dir, notify::RecursiveMode::Recursive)?;

    if blog.static_dir.exists() {
        watcher.watch(&blog.static_dir, notify::RecursiveMode::Recursive)?;
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Debounce: only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    if let Err(e) = rebuild(blog) {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Re-read the configuration so edits to it take effect
fn rebuild(blog: &Blog) -> Result<()> {
    let blog = Blog::new(&blog.base_dir)?;
    run(&blog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_run_generates_site() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "content/posts/hello-world.md",
            "---\ntitle: Hello\n---\nHi.\n",
        );

        let blog = Blog::new(dir.path()).unwrap();
        run(&blog).unwrap();
        assert!(blog.public_dir.join("posts/hello-world/index.html").is_file());
    }

    #[test]
    fn test_invalid_post_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "content/posts/hello-world.md",
            "---\ntitle: Hello\n---\nHi.\n",
        );
        write(dir.path(), "content/posts/zz-broken.md", "---\ntags: [x]\n---\n");

        let blog = Blog::new(dir.path()).unwrap();
        let err = run(&blog).unwrap_err();
        assert!(format!("{:#}", err).contains("zz-broken.md"));
        assert!(!blog.public_dir.exists());
    }

    #[test]
    fn test_slug_collision_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/posts/a.md", "---\ntitle: A\n---\n");
        write(dir.path(), "content/posts/a/index.md", "---\ntitle: Also A\n---\n");

        let blog = Blog::new(dir.path()).unwrap();
        assert!(run(&blog).is_err());
        assert!(!blog.public_dir.exists());
    }
}
