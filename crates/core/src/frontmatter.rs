use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Typed front matter: declared optional fields plus an open extension bag.
///
/// Unknown keys are preserved in `extra` rather than rejected, so documents
/// may carry arbitrary metadata without schema changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication date as an ISO date string (compared lexicographically).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Tag list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Any additional keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Result of splitting a raw document into front matter and body.
#[derive(Debug)]
pub struct FrontMatterSplit {
    /// Parsed front matter. Empty mapping when the document has none.
    pub matter: FrontMatter,
    /// Byte offset inside the original document where the body begins.
    pub body_start: usize,
}

impl FrontMatterSplit {
    fn without_matter() -> Self {
        Self {
            matter: FrontMatter::default(),
            body_start: 0,
        }
    }
}

/// Errors emitted while parsing a front matter block.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Opening `---` fence with no closing fence.
    #[error("unterminated front matter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse as the declared shape.
    #[error("front matter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("front matter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits a raw document into `(FrontMatter, body_start)`.
///
/// Recognizes a leading `---` YAML fence, tolerating a UTF-8 BOM, blank
/// leading lines, and CRLF line endings. A document without a fence returns
/// an empty mapping and `body_start == 0`. A fence that opens but cannot be
/// parsed is an error; callers decide whether that is fatal or a fallback.
pub fn split_front_matter(input: &str) -> Result<FrontMatterSplit, FrontmatterError> {
    match locate_block(input)? {
        Some((block, body_start)) => Ok(FrontMatterSplit {
            matter: parse_block(block)?,
            body_start,
        }),
        None => Ok(FrontMatterSplit::without_matter()),
    }
}

fn parse_block(block: &str) -> Result<FrontMatter, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match value {
        serde_yaml::Value::Null => Ok(FrontMatter::default()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|err| FrontmatterError::Parse(err.to_string()))
        }
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Finds the YAML block between the opening and closing fences.
///
/// Returns the block text and the byte offset of the first line after the
/// closing fence, both relative to the original (pre-BOM-strip) input.
fn locate_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let (text, bom_len) = strip_bom(input);
    let mut lines = line_offsets(text);

    // Skip leading blank lines; the first non-blank line must be a fence.
    let block_start = loop {
        match lines.next() {
            Some((line, _, end)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if is_fence(line) {
                    break end;
                }
                return Ok(None);
            }
            None => return Ok(None),
        }
    };

    for (line, start, end) in lines {
        if is_fence(line) {
            let block = text[block_start..start].trim_end_matches(['\r', '\n']);
            return Ok(Some((block, bom_len + end)));
        }
    }

    Err(FrontmatterError::Unterminated)
}

/// Iterator over `(line, start_offset, end_offset)` where `end_offset` points
/// past the line terminator.
fn line_offsets(text: &str) -> impl Iterator<Item = (&str, usize, usize)> {
    let mut cursor = 0usize;
    std::iter::from_fn(move || {
        if cursor >= text.len() {
            return None;
        }
        let start = cursor;
        let rest = &text[start..];
        let (line, end) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], start + pos + 1),
            None => (rest, text.len()),
        };
        cursor = end;
        Some((line, start, end))
    })
}

fn strip_bom(input: &str) -> (&str, usize) {
    match input.strip_prefix('\u{feff}') {
        Some(stripped) => (stripped, '\u{feff}'.len_utf8()),
        None => (input, 0),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
