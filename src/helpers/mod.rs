//! Helper functions for templates
//!
//! URL building and HTML escaping shared by the markdown renderer, the page
//! templates and the generator.

mod html;
mod url;

pub use html::*;
pub use url::*;
