//! Wraps heading content in a self-referencing anchor link.

use crate::pipeline::{Stage, StageCapability, StageError};
use crate::tree::{Attr, RenderNode, RenderTree};

/// Stage wrapping each enriched heading's content in `<a href="#slug">`.
///
/// Wrap behavior: the link contains the heading text, not the reverse. The
/// anchor carries an `anchor` class for styling.
pub struct AutolinkHeadings;

impl Stage for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn capability(&self) -> StageCapability {
        StageCapability::Transforms
    }

    fn apply(&self, mut tree: RenderTree) -> Result<RenderTree, StageError> {
        wrap_headings(&mut tree.children);
        Ok(tree)
    }
}

fn wrap_headings(nodes: &mut [RenderNode]) {
    for node in nodes {
        match node {
            RenderNode::Heading { slug, children, .. } => {
                if let Some(slug) = slug {
                    let content = std::mem::take(children);
                    children.push(RenderNode::element(
                        "a",
                        vec![
                            Attr::new("href", format!("#{slug}")),
                            Attr::new("class", "anchor"),
                        ],
                        content,
                    ));
                }
            }
            RenderNode::Element { children, .. } | RenderNode::Component { children, .. } => {
                wrap_headings(children);
            }
            _ => {}
        }
    }
}
