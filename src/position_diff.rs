use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::mutants::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Equal,
    Insert,
    Delete,
}

/// One run of text that is equal, only in the new text, or only in the old text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChunk {
    pub op: DiffOp,
    pub text: String,
}

impl DiffChunk {
    pub fn new(op: DiffOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

/// The unit the text diff works in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffGranularity {
    #[default]
    Chars,
    Lines,
}

/// Line/column extent of a piece of text: how far a position moves when reading over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Number of newlines in the text.
    pub lines: usize,
    /// Characters after the last newline (or in total, if there is none).
    pub column: usize,
}

impl Offset {
    pub fn of(text: &str) -> Self {
        match text.rfind('\n') {
            Some(idx) => Self {
                lines: text.matches('\n').count(),
                column: text[idx + 1..].chars().count(),
            },
            None => Self {
                lines: 0,
                column: text.chars().count(),
            },
        }
    }

    /// The position reached after reading this text starting at `from`.
    pub fn advance(&self, from: Position) -> Position {
        if self.lines == 0 {
            Position::new(from.line, from.column.saturating_add(self.column))
        } else {
            Position::new(from.line.saturating_add(self.lines), self.column)
        }
    }
}

pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Diff `old` against `new` after normalizing line endings.
///
/// Adjacent changes with the same tag are merged, so chunks alternate between operations.
/// Equal and delete chunks concatenate to the old text; equal and insert chunks to the new one.
pub fn diff_texts(old: &str, new: &str, granularity: DiffGranularity) -> Vec<DiffChunk> {
    let old = normalize_line_endings(old);
    let new = normalize_line_endings(new);

    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    let diff = match granularity {
        DiffGranularity::Chars => config.diff_chars(&*old, &*new),
        DiffGranularity::Lines => config.diff_lines(&*old, &*new),
    };

    let mut chunks: Vec<DiffChunk> = Vec::new();
    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => DiffOp::Equal,
            ChangeTag::Insert => DiffOp::Insert,
            ChangeTag::Delete => DiffOp::Delete,
        };
        match chunks.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => chunks.push(DiffChunk::new(op, change.value())),
        }
    }
    chunks
}
