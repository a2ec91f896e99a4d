//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub static_dir: String,
    pub tag_dir: String,

    // Writing
    pub render_drafts: bool,
    #[serde(default)]
    pub reading_time: ReadingTimeConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Navigation
    #[serde(default = "default_menu")]
    pub menu: Vec<MenuLink>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            tag_dir: "tag".to_string(),

            render_drafts: false,
            reading_time: ReadingTimeConfig::default(),
            highlight: HighlightConfig::default(),

            menu: default_menu(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Tag directory without surrounding slashes
    pub fn tag_prefix(&self) -> &str {
        self.tag_dir.trim_matches('/')
    }
}

/// A navigation link rendered in the page header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuLink {
    pub name: String,
    pub path: String,
}

fn default_menu() -> Vec<MenuLink> {
    vec![
        MenuLink {
            name: "Home".to_string(),
            path: "/".to_string(),
        },
        MenuLink {
            name: "About".to_string(),
            path: "/about".to_string(),
        },
    ]
}

/// Reading time label configuration.
///
/// Both fields are optional; the estimator falls back to its defaults
/// when they are missing or unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingTimeConfig {
    pub words_per_minute: Option<u32>,
    /// Label template, `{minutes}` and `{words}` are substituted
    pub label: Option<String>,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.source_dir, "content");
        assert_eq!(config.tag_dir, "tag");
        assert_eq!(config.menu.len(), 2);
        assert!(config.reading_time.label.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Khalid's Notes
author: Khalid
tag_dir: /posts/tag/
reading_time:
  words_per_minute: 250
menu:
  - name: Home
    path: /
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Khalid's Notes");
        assert_eq!(config.tag_prefix(), "posts/tag");
        assert_eq!(config.reading_time.words_per_minute, Some(250));
        assert_eq!(config.reading_time.label, None);
        assert_eq!(config.menu.len(), 1);
        // untouched sections keep their defaults
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\nrender_drafts: true\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From Disk");
        assert!(config.render_drafts);
    }
}
