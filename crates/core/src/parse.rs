//! Markdown parsing options and the markdown-rs adapter.

use crate::{MarkpressError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs (tables, strikethrough,
    /// task lists, autolink literals).
    pub gfm: bool,
    /// Admit raw HTML as passthrough nodes in the AST. Admitted markup is
    /// legal input only to the final sanitize stage.
    pub raw_html: bool,
}

impl ParseOptions {
    /// Pipeline defaults: GFM on, raw HTML admitted at parse time.
    pub const fn standard() -> Self {
        Self {
            gfm: true,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            // A stray fence after the body split must not re-parse as a
            // thematic break.
            frontmatter: true,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parse markdown into an mdast tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, MarkpressError> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| MarkpressError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown::mdast::Node;

    #[test]
    fn parses_basic_document() {
        let root = parse_mdast("# Title\n\nBody text.", &ParseOptions::standard()).unwrap();
        let Node::Root(root) = root else {
            panic!("expected root node");
        };
        assert_eq!(root.children.len(), 2);
        assert!(matches!(root.children[0], Node::Heading(_)));
        assert!(matches!(root.children[1], Node::Paragraph(_)));
    }

    #[test]
    fn gfm_tables_enabled_by_default() {
        let root = parse_mdast("| a | b |\n| - | - |\n| 1 | 2 |", &ParseOptions::standard())
            .unwrap();
        let Node::Root(root) = root else {
            panic!("expected root node");
        };
        assert!(matches!(root.children[0], Node::Table(_)));
    }

    #[test]
    fn raw_html_admitted_as_passthrough_nodes() {
        let root = parse_mdast("<div>hello</div>", &ParseOptions::standard()).unwrap();
        let Node::Root(root) = root else {
            panic!("expected root node");
        };
        assert!(matches!(root.children[0], Node::Html(_)));
    }

    #[test]
    fn raw_html_off_yields_text() {
        let options = ParseOptions {
            gfm: true,
            raw_html: false,
        };
        let root = parse_mdast("<div>hello</div>", &options).unwrap();
        let Node::Root(root) = root else {
            panic!("expected root node");
        };
        assert!(matches!(root.children[0], Node::Paragraph(_)));
    }
}
