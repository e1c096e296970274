//! Packages the final tree into an immutable render payload and emits HTML.

use crate::registry::{ComponentCall, ComponentRegistry};
use crate::tree::{Attr, RenderNode, RenderTree, Token};
use serde::Serialize;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// The pipeline's final, presentation-ready output.
///
/// Opaque and immutable once produced; a pure function of the raw source and
/// the active schema. Identical trees serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPayload {
    tree: RenderTree,
}

impl RenderPayload {
    /// Packages a final tree.
    pub fn new(tree: RenderTree) -> Self {
        Self { tree }
    }

    /// Structural JSON view of the payload (for callers that template the
    /// tree themselves rather than consuming HTML).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("render tree serialization is infallible")
    }

    /// Emits HTML, resolving embeddable components against the caller's
    /// registry. Unknown component names render their slot content and are
    /// reported at warn level; nothing is dropped silently.
    pub fn render(&self, registry: &ComponentRegistry) -> String {
        let mut out = String::new();
        for node in &self.tree.children {
            write_node(&mut out, node, registry);
        }
        out
    }
}

fn write_node(out: &mut String, node: &RenderNode, registry: &ComponentRegistry) {
    match node {
        RenderNode::Text { value } => out.push_str(&html_escape::encode_text(value)),
        RenderNode::RawHtml { value } => out.push_str(value),
        RenderNode::Element {
            tag,
            attrs,
            children,
        } => write_element(out, tag, attrs, children, registry),
        RenderNode::Heading {
            depth,
            slug,
            children,
        } => {
            let tag = format!("h{depth}");
            let attrs: Vec<Attr> = slug
                .iter()
                .map(|slug| Attr::new("id", slug.clone()))
                .collect();
            write_element(out, &tag, &attrs, children, registry);
        }
        RenderNode::CodeBlock { lang, code, tokens } => {
            write_code_block(out, lang.as_deref(), code, tokens.as_deref());
        }
        RenderNode::Component {
            name,
            attrs,
            children,
        } => {
            let mut children_html = String::new();
            for child in children {
                write_node(&mut children_html, child, registry);
            }
            let call = ComponentCall {
                name,
                attrs,
                children_html: &children_html,
            };
            match registry.render(&call) {
                Some(html) => out.push_str(&html),
                None => {
                    log::warn!("unknown component <{}>; rendering slot content only", name);
                    out.push_str(&children_html);
                }
            }
        }
    }
}

fn write_element(
    out: &mut String,
    tag: &str,
    attrs: &[Attr],
    children: &[RenderNode],
    registry: &ComponentRegistry,
) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if !attr.value.is_empty() {
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
            out.push('"');
        }
    }

    if VOID_ELEMENTS.contains(&tag) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in children {
        write_node(out, child, registry);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_code_block(out: &mut String, lang: Option<&str>, code: &str, tokens: Option<&[Token]>) {
    out.push_str("<pre><code");
    if let Some(lang) = lang {
        out.push_str(" class=\"language-");
        out.push_str(&html_escape::encode_double_quoted_attribute(lang));
        out.push('"');
    }
    out.push('>');

    match tokens {
        Some(tokens) => {
            for token in tokens {
                match token.kind.css_class() {
                    Some(class) => {
                        out.push_str("<span class=\"token ");
                        out.push_str(class);
                        out.push_str("\">");
                        out.push_str(&html_escape::encode_text(&token.text));
                        out.push_str("</span>");
                    }
                    None => out.push_str(&html_escape::encode_text(&token.text)),
                }
            }
        }
        None => out.push_str(&html_escape::encode_text(code)),
    }

    out.push_str("</code></pre>");
}
