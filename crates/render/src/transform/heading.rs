//! Heading enrichment: assigns stable, unique slugs in document order.

use crate::pipeline::{Stage, StageCapability, StageError};
use crate::tree::{RenderNode, RenderTree, text_content};
use markpress_core::Slugger;

/// Stage assigning a unique, non-empty slug to every heading.
pub struct HeadingSlugs;

impl Stage for HeadingSlugs {
    fn name(&self) -> &'static str {
        "heading-slugs"
    }

    fn capability(&self) -> StageCapability {
        StageCapability::Annotates
    }

    fn apply(&self, mut tree: RenderTree) -> Result<RenderTree, StageError> {
        let mut slugger = Slugger::new();
        assign_slugs(&mut tree.children, &mut slugger);
        Ok(tree)
    }
}

fn assign_slugs(nodes: &mut [RenderNode], slugger: &mut Slugger) {
    for node in nodes {
        match node {
            RenderNode::Heading { slug, children, .. } => {
                *slug = Some(slugger.next_slug(&text_content(children)));
            }
            RenderNode::Element { children, .. } | RenderNode::Component { children, .. } => {
                assign_slugs(children, slugger);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(text: &str) -> RenderNode {
        RenderNode::Heading {
            depth: 2,
            slug: None,
            children: vec![RenderNode::text(text)],
        }
    }

    fn slug_of(node: &RenderNode) -> Option<&str> {
        match node {
            RenderNode::Heading { slug, .. } => slug.as_deref(),
            _ => None,
        }
    }

    #[test]
    fn assigns_slugs_in_document_order() {
        let tree = RenderTree::new(vec![heading("Getting Started"), heading("Getting Started")]);
        let tree = HeadingSlugs.apply(tree).unwrap();
        assert_eq!(slug_of(&tree.children[0]), Some("getting-started"));
        assert_eq!(slug_of(&tree.children[1]), Some("getting-started-1"));
    }

    #[test]
    fn slug_never_empty() {
        let tree = RenderTree::new(vec![heading("!!!")]);
        let tree = HeadingSlugs.apply(tree).unwrap();
        assert_eq!(slug_of(&tree.children[0]), Some("section"));
    }

    #[test]
    fn uses_nested_inline_text() {
        let tree = RenderTree::new(vec![RenderNode::Heading {
            depth: 1,
            slug: None,
            children: vec![
                RenderNode::text("Use "),
                RenderNode::element("code", vec![], vec![RenderNode::text("serde")]),
            ],
        }]);
        let tree = HeadingSlugs.apply(tree).unwrap();
        assert_eq!(slug_of(&tree.children[0]), Some("use-serde"));
    }
}
