//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::templates::STYLESHEET;
use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Blog
description: ''
author: ''
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: content
public_dir: public
static_dir: static
tag_dir: tag

# Writing
render_drafts: false
reading_time:
  words_per_minute: 200
  label: '{minutes} min read'
highlight:
  theme: base16-ocean.dark
  line_number: false

# Navigation
menu:
  - name: Home
    path: /
  - name: About
    path: /about
"#;

const ABOUT_PAGE: &str = r#"---
title: About
description: Who writes this blog
---

Tell your readers about yourself.
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already contains a blog", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("static/css/style.css"), STYLESHEET)?;
    fs::write(target_dir.join("content/about.md"), ABOUT_PAGE)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
description: Your very first post
date: {}
tags: [intro]
---

Welcome! This is your very first post. Edit or delete it, then start writing.

## Quick Start

### Create a new post

```bash
$ postbook new "My New Post"
```

### Run server

```bash
$ postbook server
```

### Generate static files

```bash
$ postbook generate
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("content/posts/hello-world.md"), sample_post)?;

    tracing::info!("Initialized blog in {:?}", target_dir);
    Ok(())
}
