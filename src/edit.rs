//! Byte-range edits applied to a document in a single pass.
//!
//! The annotator never rewrites a document directly; it emits a list of
//! `Edit`s against the original byte offsets, which are then applied
//! back-to-front so earlier edits cannot invalidate later offsets.

use std::ops::Range;

/// A single replacement of a byte range with new text.
///
/// An insertion is a replacement over an empty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte range in the original document to replace
    pub range: Range<usize>,
    /// Replacement text
    pub replacement: String,
}

impl Edit {
    /// Insert `text` at byte offset `at` without removing anything.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            replacement: text.into(),
        }
    }

    /// Replace the bytes in `range` with `text`.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            replacement: text.into(),
        }
    }
}

/// Apply a set of non-overlapping edits to `content`.
///
/// Edits are sorted by start offset and applied in reverse document order.
pub fn apply_edits(content: &str, edits: &[Edit]) -> String {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.range.start, e.range.end));

    let mut result = content.to_string();
    for edit in ordered.iter().rev() {
        result.replace_range(edit.range.clone(), &edit.replacement);
    }
    result
}
