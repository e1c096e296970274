use crate::frontmatter::FrontmatterError;
use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path.
    pub file: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information.
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while loading or compiling a document.
#[derive(Debug, Error)]
pub enum MarkpressError {
    /// Requested document or content root does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that failed to resolve.
        path: PathBuf,
    },
    /// IO error while reading a document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed front matter block.
    #[error("front matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
    /// markdown-rs parser error surfaced through the adapter.
    #[error("parse error at {location}: {message}")]
    Parse {
        /// Error message.
        message: String,
        /// Source location.
        location: SourceLocation,
    },
    /// A pipeline stage failed; no partial tree is produced.
    #[error("stage '{stage}' failed: {message}")]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// Error message.
        message: String,
    },
}

impl MarkpressError {
    /// Create a parse error with location.
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a not-found error for a path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Non-fatal warnings collected during a compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// Front matter block was malformed; the document fell back to an empty mapping.
    FrontmatterFallback {
        /// Underlying parse failure message.
        message: String,
    },
    /// Fenced code block declared a language the highlighter does not recognize
    /// or that was disabled by configuration. Content is preserved unhighlighted.
    UnknownLanguage {
        /// The declared language tag.
        lang: String,
    },
    /// Embeddable component name not present in the caller's registry.
    /// Children are rendered; the component wrapper is skipped.
    UnknownComponent {
        /// Component name as written in the document.
        name: String,
    },
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileWarning::FrontmatterFallback { message } => {
                write!(f, "front matter ignored: {}", message)
            }
            CompileWarning::UnknownLanguage { lang } => {
                write!(f, "unrecognized code language '{}'", lang)
            }
            CompileWarning::UnknownComponent { name } => {
                write!(f, "unknown component <{}>", name)
            }
        }
    }
}

/// Collection of non-fatal diagnostics for a single compile.
#[derive(Debug, Clone, Default)]
pub struct CompileDiagnostics {
    /// Warnings in the order they were observed.
    pub warnings: Vec<CompileWarning>,
}

impl CompileDiagnostics {
    /// Create an empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning.
    pub fn add_warning(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Total warning count.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
