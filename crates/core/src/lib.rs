#![deny(missing_docs)]
//! Markpress core: front matter extraction, slug generation, and markdown parsing.

/// Core error, warning, and diagnostic types.
pub mod error;
/// YAML front matter extraction.
pub mod frontmatter;
/// Markdown parsing options and the markdown-rs adapter.
pub mod parse;
/// Heading slug generation.
pub mod slug;

pub use error::{CompileDiagnostics, CompileWarning, MarkpressError, SourceLocation};
pub use frontmatter::{FrontMatter, FrontMatterSplit, FrontmatterError, split_front_matter};
pub use parse::{ParseOptions, parse_mdast};
pub use slug::{Slugger, slugify};
