//! The render tree: block and inline nodes produced by the document parser
//! and rewritten by the transform pipeline.

use serde::Serialize;

/// A single HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    /// Attribute name (lowercase).
    pub name: String,
    /// Attribute value.
    pub value: String,
}

impl Attr {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Classification of a highlighted code token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Language keyword or storage modifier.
    Keyword,
    /// String literal.
    Str,
    /// Comment.
    Comment,
    /// Numeric literal.
    Number,
    /// Function name.
    Function,
    /// Type name.
    Type,
    /// Punctuation.
    Punctuation,
    /// Unclassified text.
    Plain,
}

impl TokenKind {
    /// CSS class fragment used when serializing (`token keyword` style).
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenKind::Keyword => Some("keyword"),
            TokenKind::Str => Some("string"),
            TokenKind::Comment => Some("comment"),
            TokenKind::Number => Some("number"),
            TokenKind::Function => Some("function"),
            TokenKind::Type => Some("type"),
            TokenKind::Punctuation => Some("punctuation"),
            TokenKind::Plain => None,
        }
    }
}

/// One classified span of code. Concatenating token texts reproduces the
/// code content exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Verbatim text of the span.
    pub text: String,
    /// Classification.
    pub kind: TokenKind,
}

/// A node in the render tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    /// A structured HTML element.
    Element {
        /// Tag name (lowercase).
        tag: String,
        /// Attributes in emission order.
        attrs: Vec<Attr>,
        /// Child nodes.
        children: Vec<RenderNode>,
    },
    /// Plain text (escaped on serialization).
    Text {
        /// Text content.
        value: String,
    },
    /// Verbatim markup admitted at parse time; legal input only to the
    /// final sanitize stage.
    RawHtml {
        /// Raw markup.
        value: String,
    },
    /// A named embeddable component resolved at render time against the
    /// caller's registry.
    Component {
        /// Component name as written (capitalized).
        name: String,
        /// Component attributes.
        attrs: Vec<Attr>,
        /// Slot content.
        children: Vec<RenderNode>,
    },
    /// A heading. The slug is assigned by the heading enrichment stage and
    /// is unique and non-empty afterwards.
    Heading {
        /// Heading depth (1-6).
        depth: u8,
        /// Stable identifier for deep links.
        slug: Option<String>,
        /// Heading content.
        children: Vec<RenderNode>,
    },
    /// A fenced code block. Tokens are attached by the highlight stage and
    /// never alter the visible text.
    CodeBlock {
        /// Language from the fence info string.
        lang: Option<String>,
        /// Code content.
        code: String,
        /// Classified tokens, when the language was recognized.
        tokens: Option<Vec<Token>>,
    },
}

impl RenderNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        RenderNode::Text {
            value: value.into(),
        }
    }

    /// Creates an element node.
    pub fn element(
        tag: impl Into<String>,
        attrs: Vec<Attr>,
        children: Vec<RenderNode>,
    ) -> Self {
        RenderNode::Element {
            tag: tag.into(),
            attrs,
            children,
        }
    }

    /// Creates a raw HTML node.
    pub fn raw(value: impl Into<String>) -> Self {
        RenderNode::RawHtml {
            value: value.into(),
        }
    }
}

/// The root of a document's render tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderTree {
    /// Top-level block nodes.
    pub children: Vec<RenderNode>,
}

impl RenderTree {
    /// Creates a tree from top-level nodes.
    pub fn new(children: Vec<RenderNode>) -> Self {
        Self { children }
    }
}

/// Extracts the plain text content of a node list (for slugs and anchors).
pub fn text_content(nodes: &[RenderNode]) -> String {
    let mut buffer = String::new();
    for node in nodes {
        collect_text(node, &mut buffer);
    }
    buffer.trim().to_string()
}

fn collect_text(node: &RenderNode, buffer: &mut String) {
    match node {
        RenderNode::Text { value } => buffer.push_str(value),
        RenderNode::CodeBlock { code, .. } => buffer.push_str(code),
        RenderNode::Element { children, .. }
        | RenderNode::Component { children, .. }
        | RenderNode::Heading { children, .. } => {
            for child in children {
                collect_text(child, buffer);
            }
        }
        // Raw markup contributes no slug text.
        RenderNode::RawHtml { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_recurses_through_inline_markup() {
        let nodes = vec![
            RenderNode::text("Getting "),
            RenderNode::element(
                "em",
                vec![],
                vec![RenderNode::element(
                    "code",
                    vec![],
                    vec![RenderNode::text("Started")],
                )],
            ),
        ];
        assert_eq!(text_content(&nodes), "Getting Started");
    }

    #[test]
    fn raw_html_excluded_from_text() {
        let nodes = vec![RenderNode::raw("<b>x</b>"), RenderNode::text("y")];
        assert_eq!(text_content(&nodes), "y");
    }
}
