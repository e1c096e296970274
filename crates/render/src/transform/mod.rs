//! Pipeline stages over the render tree.

/// Wraps heading content in self-referencing anchor links.
pub mod autolink;
/// Assigns unique slugs to headings.
pub mod heading;
/// Attaches token classification metadata to fenced code blocks.
pub mod highlight;
/// Filters tags and attributes against the allow-list schema.
pub mod sanitize;

pub use autolink::AutolinkHeadings;
pub use heading::HeadingSlugs;
pub use highlight::Highlighter;
pub use sanitize::Sanitizer;
