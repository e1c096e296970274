//! Ordered stage pipeline applied to the render tree.
//!
//! Stage order is fixed: parsing admits raw HTML and GFM constructs, then
//! heading slugs, autolink wrap, syntax highlight, and sanitize. Sanitize
//! always runs last.

use crate::schema::SanitizationSchema;
use crate::transform::autolink::AutolinkHeadings;
use crate::transform::heading::HeadingSlugs;
use crate::transform::highlight::Highlighter;
use crate::transform::sanitize::Sanitizer;
use crate::tree::RenderTree;
use markpress_core::MarkpressError;

/// Declared capability of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCapability {
    /// Adds metadata, does not remove nodes.
    Annotates,
    /// Restructures nodes.
    Transforms,
    /// May remove nodes.
    Filters,
}

/// A stage-level failure. The pipeline aborts and surfaces it; partial
/// trees are never returned.
#[derive(Debug)]
pub struct StageError {
    /// Name of the failing stage.
    pub stage: &'static str,
    /// Failure message.
    pub message: String,
}

/// One ordered tree-to-tree transformation.
pub trait Stage {
    /// Stage name used in error reporting.
    fn name(&self) -> &'static str;

    /// Declared capability.
    fn capability(&self) -> StageCapability;

    /// Consume the previous stage's tree and produce the next.
    fn apply(&self, tree: RenderTree) -> Result<RenderTree, StageError>;
}

/// Orchestrator applying stages in order.
pub struct TransformPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl TransformPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn push<S: Stage + 'static>(&mut self, stage: S) {
        self.stages.push(Box::new(stage));
    }

    /// Builds the standard fixed-order pipeline: heading slugs, autolink
    /// wrap, syntax highlight, sanitize.
    ///
    /// Passing `sanitize: false` skips the final stage; that deviation from
    /// the safe default is logged.
    pub fn standard(schema: SanitizationSchema, highlighter: Highlighter, sanitize: bool) -> Self {
        let mut pipeline = Self::new();
        pipeline.push(HeadingSlugs);
        pipeline.push(AutolinkHeadings);
        pipeline.push(highlighter);
        if sanitize {
            pipeline.push(Sanitizer::new(schema));
        } else {
            log::warn!("HTML sanitization disabled by configuration");
        }
        pipeline
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage in order, aborting on the first failure.
    pub fn run(&self, tree: RenderTree) -> Result<RenderTree, MarkpressError> {
        let mut current = tree;
        for stage in &self.stages {
            current = stage
                .apply(current)
                .map_err(|err| MarkpressError::Stage {
                    stage: err.stage,
                    message: err.message,
                })?;
        }
        Ok(current)
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::standard(SanitizationSchema::default(), Highlighter::new(None), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RenderNode;

    struct FailingStage;

    impl Stage for FailingStage {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn capability(&self) -> StageCapability {
            StageCapability::Transforms
        }
        fn apply(&self, _tree: RenderTree) -> Result<RenderTree, StageError> {
            Err(StageError {
                stage: self.name(),
                message: "boom".into(),
            })
        }
    }

    #[test]
    fn standard_pipeline_order_ends_with_sanitize() {
        let pipeline = TransformPipeline::default();
        assert_eq!(
            pipeline.stage_names(),
            vec!["heading-slugs", "autolink-headings", "syntax-highlight", "sanitize"]
        );
    }

    #[test]
    fn disabled_sanitize_drops_only_the_last_stage() {
        let pipeline = TransformPipeline::standard(
            SanitizationSchema::default(),
            Highlighter::new(None),
            false,
        );
        assert_eq!(
            pipeline.stage_names(),
            vec!["heading-slugs", "autolink-headings", "syntax-highlight"]
        );
    }

    #[test]
    fn failing_stage_aborts_with_stage_name() {
        let mut pipeline = TransformPipeline::new();
        pipeline.push(FailingStage);
        let tree = RenderTree::new(vec![RenderNode::text("x")]);
        let err = pipeline.run(tree).unwrap_err();
        match err {
            MarkpressError::Stage { stage, message } => {
                assert_eq!(stage, "failing");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
