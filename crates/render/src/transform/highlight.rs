//! Syntax highlighting: attaches token classification metadata to fenced
//! code blocks without altering their text content.

use crate::pipeline::{Stage, StageCapability, StageError};
use crate::tree::{RenderNode, RenderTree, Token, TokenKind};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Stage annotating code blocks with classified tokens.
///
/// Blocks with no language tag, an unrecognized language, or a language not
/// in `enabled_languages` pass through untouched. This stage never fails.
pub struct Highlighter {
    enabled_languages: Option<BTreeSet<String>>,
}

impl Highlighter {
    /// Creates a highlighter. `None` enables every recognized language.
    pub fn new(enabled_languages: Option<BTreeSet<String>>) -> Self {
        Self { enabled_languages }
    }

    /// Returns true if the language tag maps to a known syntax.
    pub fn recognizes(&self, lang: &str) -> bool {
        SYNTAX_SET.find_syntax_by_token(lang).is_some()
    }

    fn enabled(&self, lang: &str) -> bool {
        self.enabled_languages
            .as_ref()
            .is_none_or(|set| set.contains(lang))
    }

    /// Tokenizes code, returning `None` when the language is unknown or the
    /// parser gives up. Token texts concatenate back to the exact input.
    fn tokenize(&self, lang: &str, code: &str) -> Option<Vec<Token>> {
        let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens: Vec<Token> = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = state.parse_line(line, &SYNTAX_SET).ok()?;
            let mut cursor = 0usize;
            for (index, op) in &ops {
                if *index > cursor {
                    push_token(&mut tokens, &line[cursor..*index], classify(&stack));
                    cursor = *index;
                }
                stack.apply(op).ok()?;
            }
            if cursor < line.len() {
                push_token(&mut tokens, &line[cursor..], classify(&stack));
            }
        }

        Some(tokens)
    }
}

impl Stage for Highlighter {
    fn name(&self) -> &'static str {
        "syntax-highlight"
    }

    fn capability(&self) -> StageCapability {
        StageCapability::Annotates
    }

    fn apply(&self, mut tree: RenderTree) -> Result<RenderTree, StageError> {
        annotate(&mut tree.children, self);
        Ok(tree)
    }
}

fn annotate(nodes: &mut [RenderNode], highlighter: &Highlighter) {
    for node in nodes {
        match node {
            RenderNode::CodeBlock {
                lang: Some(lang),
                code,
                tokens,
            } => {
                if !highlighter.enabled(lang) {
                    continue;
                }
                match highlighter.tokenize(lang, code) {
                    Some(classified) => *tokens = Some(classified),
                    None => log::debug!("no syntax for code language '{}'", lang),
                }
            }
            RenderNode::Element { children, .. } | RenderNode::Component { children, .. } => {
                annotate(children, highlighter);
            }
            _ => {}
        }
    }
}

/// Merge adjacent same-kind spans to keep token streams compact.
fn push_token(tokens: &mut Vec<Token>, text: &str, kind: TokenKind) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = tokens.last_mut()
        && last.kind == kind
    {
        last.text.push_str(text);
        return;
    }
    tokens.push(Token {
        text: text.to_string(),
        kind,
    });
}

/// Maps the innermost matching scope to a coarse token kind.
fn classify(stack: &ScopeStack) -> TokenKind {
    for scope in stack.scopes.iter().rev() {
        let name = scope.build_string();
        if name.starts_with("comment") {
            return TokenKind::Comment;
        }
        if name.starts_with("string") {
            return TokenKind::Str;
        }
        if name.starts_with("constant.numeric") {
            return TokenKind::Number;
        }
        if name.starts_with("entity.name.function") || name.starts_with("support.function") {
            return TokenKind::Function;
        }
        if name.starts_with("entity.name.type")
            || name.starts_with("entity.name.class")
            || name.starts_with("support.type")
            || name.starts_with("support.class")
        {
            return TokenKind::Type;
        }
        if name.starts_with("keyword") || name.starts_with("storage") {
            return TokenKind::Keyword;
        }
        if name.starts_with("punctuation") {
            return TokenKind::Punctuation;
        }
    }
    TokenKind::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_block(lang: Option<&str>, code: &str) -> RenderTree {
        RenderTree::new(vec![RenderNode::CodeBlock {
            lang: lang.map(String::from),
            code: code.to_string(),
            tokens: None,
        }])
    }

    fn tokens_of(tree: &RenderTree) -> Option<&Vec<Token>> {
        match &tree.children[0] {
            RenderNode::CodeBlock { tokens, .. } => tokens.as_ref(),
            _ => panic!("expected code block"),
        }
    }

    #[test]
    fn rust_code_gets_classified_tokens() {
        let code = "// comment\nlet s = \"hi\";\n";
        let tree = Highlighter::new(None)
            .apply(code_block(Some("rust"), code))
            .unwrap();
        let tokens = tokens_of(&tree).expect("tokens attached");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Str));
    }

    #[test]
    fn token_texts_concatenate_to_code() {
        let code = "fn main() {\n    println!(\"hello\");\n}\n";
        let tree = Highlighter::new(None)
            .apply(code_block(Some("rust"), code))
            .unwrap();
        let tokens = tokens_of(&tree).expect("tokens attached");
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, code);
    }

    #[test]
    fn unrecognized_language_passes_through() {
        let tree = Highlighter::new(None)
            .apply(code_block(Some("nosuchlang"), "x"))
            .unwrap();
        assert!(tokens_of(&tree).is_none());
        let RenderNode::CodeBlock { code, .. } = &tree.children[0] else {
            unreachable!()
        };
        assert_eq!(code, "x");
    }

    #[test]
    fn missing_language_passes_through() {
        let tree = Highlighter::new(None).apply(code_block(None, "x")).unwrap();
        assert!(tokens_of(&tree).is_none());
    }

    #[test]
    fn disabled_language_passes_through() {
        let enabled = Some(["python".to_string()].into_iter().collect());
        let tree = Highlighter::new(enabled)
            .apply(code_block(Some("rust"), "fn main() {}"))
            .unwrap();
        assert!(tokens_of(&tree).is_none());
    }
}
