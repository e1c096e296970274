#![deny(missing_docs)]
//! Markpress loader: discovers documents under a content root and runs the
//! full per-document pipeline for each one in parallel.
//!
//! File reads fan out one task per file and join before sorting; a slow or
//! failing file never blocks collection of the others' results. No shared
//! mutable state crosses document boundaries: compile options (schema,
//! highlighter configuration) are read-only across the batch.

use markpress_core::{FrontMatter, MarkpressError};
use markpress_render::{CompileOptions, CompiledDocument, RenderPayload, compile};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Options for a directory load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File extension filter (without the dot).
    pub extension: String,
    /// Per-document compile options, shared read-only across the batch.
    pub compile: CompileOptions,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            compile: CompileOptions::default(),
        }
    }
}

/// A successfully loaded document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Identifier derived from the file stem.
    pub slug: String,
    /// Extracted front matter.
    pub front_matter: FrontMatter,
    /// Final render payload.
    pub payload: RenderPayload,
}

/// A per-file failure, reported alongside sibling successes.
#[derive(Debug)]
pub struct LoadFailure {
    /// Slug of the file that failed.
    pub slug: String,
    /// The error.
    pub error: MarkpressError,
}

/// Batch statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Total number of files processed.
    pub total: usize,
    /// Number of successful loads.
    pub succeeded: usize,
    /// Number of failed loads.
    pub failed: usize,
}

/// Result of a directory load: best-effort sorted documents plus an
/// explicit per-slug error list. One bad file never fails the batch.
#[derive(Debug)]
pub struct DirectoryCollection {
    /// Documents sorted by front-matter date descending; dateless documents
    /// keep their relative order after all dated ones.
    pub documents: Vec<LoadedDocument>,
    /// Per-file failures.
    pub errors: Vec<LoadFailure>,
    /// Batch statistics.
    pub stats: LoadStats,
}

/// Loads a single document from a path, deriving its slug from the file stem.
pub fn load_document(path: &Path, options: &CompileOptions) -> Result<LoadedDocument, MarkpressError> {
    let slug = slug_for(path);
    let source = read_source(path)?;
    let CompiledDocument {
        front_matter,
        payload,
        diagnostics,
    } = compile(&source, options)?;
    for warning in &diagnostics.warnings {
        log::warn!("{}: {}", slug, warning);
    }
    Ok(LoadedDocument {
        slug,
        front_matter,
        payload,
    })
}

/// Discovers and loads every matching document under the content root.
///
/// A missing root is fatal; everything past discovery is isolated per file.
pub fn load_directory(
    root: &Path,
    options: &LoadOptions,
) -> Result<DirectoryCollection, MarkpressError> {
    if !root.is_dir() {
        return Err(MarkpressError::not_found(root));
    }

    let mut files = list_files(root, &options.extension)?;
    // Deterministic fan-out order; the date sort below is stable, so
    // dateless documents keep this relative order.
    files.sort();

    let outcomes: Vec<Result<LoadedDocument, LoadFailure>> = files
        .par_iter()
        .map(|path| {
            load_document(path, &options.compile).map_err(|error| LoadFailure {
                slug: slug_for(path),
                error,
            })
        })
        .collect();

    let mut documents = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(document) => documents.push(document),
            Err(failure) => errors.push(failure),
        }
    }

    documents.sort_by(|a, b| compare_dates(&a.front_matter, &b.front_matter));

    let stats = LoadStats {
        total: files.len(),
        succeeded: documents.len(),
        failed: errors.len(),
    };
    Ok(DirectoryCollection {
        documents,
        errors,
        stats,
    })
}

/// Date-descending order; documents without a date sort after all dated
/// documents. ISO date strings compare lexicographically.
fn compare_dates(a: &FrontMatter, b: &FrontMatter) -> Ordering {
    match (a.date.as_deref(), b.date.as_deref()) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn list_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, MarkpressError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    Ok(files)
}

fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn read_source(path: &Path) -> Result<String, MarkpressError> {
    std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            MarkpressError::not_found(path)
        } else {
            MarkpressError::Io(err)
        }
    })
}
