//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::MenuLink;
pub use site::ReadingTimeConfig;
pub use site::SiteConfig;
