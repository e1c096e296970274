//! Allow-list sanitization. Runs last, never fails: unknown input degrades
//! to content removed, not to an error.

use crate::pipeline::{Stage, StageCapability, StageError};
use crate::schema::SanitizationSchema;
use crate::tree::{RenderNode, RenderTree};
use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};
use std::cell::Cell;

/// Stage filtering tags and attributes against the schema.
///
/// Structured elements are walked depth-first; verbatim raw-HTML fragments
/// are rewritten with the same policy. Disallowed container tags unwrap
/// (children survive); inherently unsafe tags drop their whole subtree.
/// Removals are observable at debug level.
pub struct Sanitizer {
    schema: SanitizationSchema,
}

impl Sanitizer {
    /// Creates a sanitizer over the given schema.
    pub fn new(schema: SanitizationSchema) -> Self {
        Self { schema }
    }
}

impl Stage for Sanitizer {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn capability(&self) -> StageCapability {
        StageCapability::Filters
    }

    fn apply(&self, tree: RenderTree) -> Result<RenderTree, StageError> {
        let mut removed = 0usize;
        let children = sanitize_nodes(tree.children, &self.schema, &mut removed);
        if removed > 0 {
            log::debug!("sanitizer removed {} node(s)/attribute(s)", removed);
        }
        Ok(RenderTree::new(children))
    }
}

fn sanitize_nodes(
    nodes: Vec<RenderNode>,
    schema: &SanitizationSchema,
    removed: &mut usize,
) -> Vec<RenderNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            RenderNode::Element {
                tag,
                attrs,
                children,
            } => {
                let children = sanitize_nodes(children, schema, removed);
                if schema.allows_tag(&tag) {
                    let kept = attrs
                        .into_iter()
                        .filter(|attr| {
                            let keep = schema.allows_attribute(&tag, &attr.name);
                            if !keep {
                                *removed += 1;
                                log::debug!("sanitizer dropped attribute '{}' on <{}>", attr.name, tag);
                            }
                            keep
                        })
                        .collect();
                    out.push(RenderNode::Element {
                        tag,
                        attrs: kept,
                        children,
                    });
                } else if schema.drops_subtree(&tag) {
                    *removed += 1;
                    log::debug!("sanitizer dropped <{}> subtree", tag);
                } else {
                    // Unwrap: content preserved, wrapper removed.
                    *removed += 1;
                    log::debug!("sanitizer unwrapped <{}>", tag);
                    out.extend(children);
                }
            }
            RenderNode::Heading {
                depth,
                slug,
                children,
            } => {
                let children = sanitize_nodes(children, schema, removed);
                let tag = format!("h{depth}");
                if schema.allows_tag(&tag) {
                    out.push(RenderNode::Heading {
                        depth,
                        slug,
                        children,
                    });
                } else {
                    *removed += 1;
                    out.extend(children);
                }
            }
            RenderNode::Component {
                name,
                attrs,
                children,
            } => {
                // Component attributes are registry props, not markup; only
                // slot content is markup to filter.
                out.push(RenderNode::Component {
                    name,
                    attrs,
                    children: sanitize_nodes(children, schema, removed),
                });
            }
            RenderNode::RawHtml { value } => {
                let clean = sanitize_fragment(&value, schema, removed);
                if !clean.is_empty() {
                    out.push(RenderNode::raw(clean));
                }
            }
            keep @ (RenderNode::Text { .. } | RenderNode::CodeBlock { .. }) => out.push(keep),
        }
    }
    out
}

/// Rewrites a verbatim markup fragment against the schema.
///
/// Never fails: a fragment the rewriter cannot process is removed wholesale.
fn sanitize_fragment(html: &str, schema: &SanitizationSchema, removed: &mut usize) -> String {
    let dropped = Cell::new(0usize);

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();
                if schema.allows_tag(&tag) {
                    let names: Vec<String> =
                        el.attributes().iter().map(|attr| attr.name()).collect();
                    for name in names {
                        if !schema.allows_attribute(&tag, &name) {
                            el.remove_attribute(&name);
                            dropped.set(dropped.get() + 1);
                        }
                    }
                } else if schema.drops_subtree(&tag) {
                    el.remove();
                    dropped.set(dropped.get() + 1);
                } else {
                    el.remove_and_keep_content();
                    dropped.set(dropped.get() + 1);
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_comments!(|comment| {
                comment.remove();
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    *removed += dropped.get();

    match result {
        Ok(clean) => clean,
        Err(err) => {
            *removed += 1;
            log::debug!("sanitizer discarded unprocessable fragment: {}", err);
            String::new()
        }
    }
}
