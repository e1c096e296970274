#![deny(missing_docs)]
//! Markpress render: the content transformation pipeline.
//!
//! Raw text flows through front matter splitting, markdown parsing with raw
//! HTML admitted, lowering into a render tree, the fixed-order transform
//! pipeline (heading slugs, autolink wrap, syntax highlight, sanitize last),
//! and finally serialization into an immutable render payload.

/// mdast-to-render-tree lowering.
pub mod lower;
/// Ordered stage pipeline.
pub mod pipeline;
/// Component registry resolved at render time.
pub mod registry;
/// Allow-list sanitization schema.
pub mod schema;
/// Render payload packaging and HTML emission.
pub mod serialize;
/// Pipeline stages.
pub mod transform;
/// Render tree node types.
pub mod tree;

use markpress_core::{
    CompileDiagnostics, CompileWarning, FrontMatter, MarkpressError, ParseOptions, parse_mdast,
    split_front_matter,
};
use std::collections::BTreeSet;

pub use pipeline::{Stage, StageCapability, StageError, TransformPipeline};
pub use registry::{ComponentCall, ComponentRegistry};
pub use schema::SanitizationSchema;
pub use serialize::RenderPayload;
pub use transform::{AutolinkHeadings, HeadingSlugs, Highlighter, Sanitizer};
pub use tree::{Attr, RenderNode, RenderTree, Token, TokenKind};

/// Policy for malformed front matter blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrontmatterPolicy {
    /// Fall back to an empty mapping with a recoverable warning (default).
    #[default]
    Lenient,
    /// Surface the parse error to the caller.
    Strict,
}

/// Options for one compile run. Shared read-only across concurrent loads.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Markdown parsing options (GFM and raw-HTML admission).
    pub parse: ParseOptions,
    /// Sanitization allow-list; the default schema is active by default.
    pub schema: SanitizationSchema,
    /// Languages to highlight; `None` highlights all recognized languages.
    pub enabled_languages: Option<BTreeSet<String>>,
    /// Malformed-front-matter policy.
    pub frontmatter_policy: FrontmatterPolicy,
    /// Set to skip the sanitize stage. The deviation is logged.
    pub disable_sanitizer: bool,
}

/// A fully compiled document: front matter plus the immutable payload.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    /// Extracted front matter (single source of truth, never re-derived).
    pub front_matter: FrontMatter,
    /// The final render payload.
    pub payload: RenderPayload,
    /// Non-fatal warnings gathered during the compile.
    pub diagnostics: CompileDiagnostics,
}

/// Runs the full per-document pipeline.
///
/// The payload is a pure function of `source` and the options: compiling the
/// same input twice yields identical payloads.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompiledDocument, MarkpressError> {
    let mut diagnostics = CompileDiagnostics::new();

    let (front_matter, body) = match split_front_matter(source) {
        Ok(split) => (split.matter, &source[split.body_start..]),
        Err(err) => match options.frontmatter_policy {
            FrontmatterPolicy::Strict => return Err(err.into()),
            FrontmatterPolicy::Lenient => {
                diagnostics.add_warning(CompileWarning::FrontmatterFallback {
                    message: err.to_string(),
                });
                (FrontMatter::default(), source)
            }
        },
    };

    let mdast = parse_mdast(body, &options.parse)?;
    let tree = lower::lower_document(&mdast);

    let highlighter = Highlighter::new(options.enabled_languages.clone());
    record_unknown_languages(&tree, &highlighter, &mut diagnostics);

    let pipeline = TransformPipeline::standard(
        options.schema.clone(),
        highlighter,
        !options.disable_sanitizer,
    );
    let tree = pipeline.run(tree)?;

    Ok(CompiledDocument {
        front_matter,
        payload: RenderPayload::new(tree),
        diagnostics,
    })
}

fn record_unknown_languages(
    tree: &RenderTree,
    highlighter: &Highlighter,
    diagnostics: &mut CompileDiagnostics,
) {
    fn walk(nodes: &[RenderNode], highlighter: &Highlighter, diagnostics: &mut CompileDiagnostics) {
        for node in nodes {
            match node {
                RenderNode::CodeBlock {
                    lang: Some(lang), ..
                } => {
                    if !highlighter.recognizes(lang) {
                        diagnostics.add_warning(CompileWarning::UnknownLanguage {
                            lang: lang.clone(),
                        });
                    }
                }
                RenderNode::Element { children, .. }
                | RenderNode::Component { children, .. } => {
                    walk(children, highlighter, diagnostics);
                }
                _ => {}
            }
        }
    }
    walk(&tree.children, highlighter, diagnostics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile_default(source: &str) -> CompiledDocument {
        compile(source, &CompileOptions::default()).unwrap()
    }

    fn html(source: &str) -> String {
        compile_default(source)
            .payload
            .render(&ComponentRegistry::new())
    }

    #[test]
    fn front_matter_round_trip() {
        let doc = compile_default("---\ntitle: \"Hello\"\n---\n# Body");
        assert_eq!(doc.front_matter.title.as_deref(), Some("Hello"));
        let html = doc.payload.render(&ComponentRegistry::new());
        assert!(!html.contains("Hello"), "front matter leaked into body: {html}");
        assert!(html.contains(">Body</a></h1>"));
    }

    #[test]
    fn deterministic_payloads() {
        let source = "---\ndate: 2024-01-01\n---\n# One\n\n# One\n\n```rust\nlet x = 1;\n```\n\n<div onclick=\"x\">raw</div>\n";
        let options = CompileOptions::default();
        let a = compile(source, &options).unwrap();
        let b = compile(source, &options).unwrap();
        assert_eq!(a.payload, b.payload);
        assert_eq!(
            a.payload.render(&ComponentRegistry::new()),
            b.payload.render(&ComponentRegistry::new())
        );
    }

    #[test]
    fn duplicate_headings_get_suffixed_slugs_and_self_links() {
        let html = html("## Getting Started\n\n## Getting Started\n");
        assert!(html.contains("<h2 id=\"getting-started\">"));
        assert!(html.contains("<h2 id=\"getting-started-1\">"));
        assert!(html.contains("<a href=\"#getting-started\" class=\"anchor\">Getting Started</a>"));
    }

    #[test]
    fn script_dropped_anchor_attribute_filtered_end_to_end() {
        let html = html("<script>x</script><a href=\"/x\" onclick=\"y\">t</a>\n");
        assert!(!html.contains("script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("<a href=\"/x\">t</a>"));
    }

    #[test]
    fn unknown_wrapper_unwrapped_content_preserved() {
        let html = html("<foo><b>bold</b></foo>\n");
        assert!(html.contains("<b>bold</b>"));
        assert!(!html.contains("foo"));
    }

    #[test]
    fn malformed_front_matter_falls_back_by_default() {
        let doc = compile_default("---\n: [broken\n---\nBody");
        assert_eq!(doc.front_matter, FrontMatter::default());
        assert!(doc.diagnostics.has_warnings());
        assert!(matches!(
            doc.diagnostics.warnings[0],
            CompileWarning::FrontmatterFallback { .. }
        ));
    }

    #[test]
    fn malformed_front_matter_errors_under_strict_policy() {
        let options = CompileOptions {
            frontmatter_policy: FrontmatterPolicy::Strict,
            ..Default::default()
        };
        let err = compile("---\n: [broken\n---\nBody", &options).unwrap_err();
        assert!(matches!(err, MarkpressError::Frontmatter(_)));
    }

    #[test]
    fn unknown_code_language_warns_and_preserves_content() {
        let doc = compile_default("```nosuchlang\nsome code\n```\n");
        assert!(doc
            .diagnostics
            .warnings
            .iter()
            .any(|w| matches!(w, CompileWarning::UnknownLanguage { lang } if lang == "nosuchlang")));
        let html = doc.payload.render(&ComponentRegistry::new());
        assert!(html.contains("some code"));
        assert!(!html.contains("token"));
    }

    #[test]
    fn highlighted_block_keeps_visible_text() {
        let html = html("```rust\nlet answer = 42;\n```\n");
        assert!(html.contains("class=\"language-rust\""));
        assert!(html.contains("token"));
        // Strip tags; the visible text must be intact.
        let mut visible = String::new();
        let mut in_tag = false;
        for ch in html.chars() {
            match ch {
                '<' => in_tag = true,
                '>' => in_tag = false,
                c if !in_tag => visible.push(c),
                _ => {}
            }
        }
        assert!(visible.contains("let answer = 42;"));
    }

    #[test]
    fn component_flows_through_pipeline_to_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register("MyButton", |call: &ComponentCall<'_>| {
            format!(
                "<button data-label=\"{}\">{}</button>",
                call.attr("label").unwrap_or_default(),
                call.children_html
            )
        });
        let doc = compile_default("<MyButton label=\"Go\">click</MyButton>\n");
        let html = doc.payload.render(&registry);
        assert_eq!(html, "<button data-label=\"Go\">click</button>");
    }

    #[test]
    fn sanitizer_can_be_disabled_explicitly() {
        let options = CompileOptions {
            disable_sanitizer: true,
            ..Default::default()
        };
        let doc = compile("<foo><b>bold</b></foo>\n", &options).unwrap();
        let html = doc.payload.render(&ComponentRegistry::new());
        assert!(html.contains("<foo>"));
    }
}
