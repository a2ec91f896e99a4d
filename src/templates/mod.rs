//! Built-in page templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

mod context;
mod page;

pub use context::{MenuItem, PostDocument, SiteData, TagLink};
pub use page::{PageRenderer, RenderStatus, Rendered};

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::html_escape;

/// Default stylesheet, served at `css/style.css` unless the site provides one
pub const STYLESHEET: &str = include_str!("default/style.css");

/// Location of the stylesheet relative to the site root
pub const STYLESHEET_PATH: &str = "css/style.css";

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Text is escaped explicitly with the `text` filter; rendered post
        // bodies are already HTML
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
            ("tag.html", include_str!("default/tag.html")),
            ("404.html", include_str!("default/404.html")),
            (
                "partials/macros.html",
                include_str!("default/partials/macros.html"),
            ),
        ])?;

        tera.register_filter("text", text_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape text for HTML content and attributes
fn text_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("text", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}
