//! Per-file size caps for collected diff text.

use crate::git::diff_split::{split_by_file, DiffChunk};
use crate::utils::text;

/// Marker git emits for binary files diffed with `--binary`.
pub(crate) const BINARY_PATCH_MARKER: &str = "GIT binary patch";

/// Sentinel git emits for binary files in a plain diff.
pub(crate) const BINARY_FILES_MARKER: &str = "Binary files ";

/// Output of [`truncate_diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruncatedDiff {
    /// Text chunks, each capped, rejoined with newlines.
    pub text: String,
    /// Sum of the untruncated lengths of every text chunk.
    pub original_len: usize,
    /// Paths of chunks that were cut, in diff order.
    pub truncated_paths: Vec<String>,
}

/// Returns `true` when a chunk carries binary content instead of text hunks.
pub fn is_binary_chunk(chunk: &str) -> bool {
    chunk.contains(BINARY_PATCH_MARKER) || chunk.contains(BINARY_FILES_MARKER)
}

/// Drops binary chunks and caps every remaining chunk at `per_file_limit`
/// bytes. A limit of `0` disables capping.
///
/// A capped chunk keeps its first `limit / 2` and last `limit - limit / 2`
/// bytes around a marker naming the path and sizes.
pub fn truncate_diff(diff: &str, per_file_limit: usize) -> TruncatedDiff {
    let diff = diff.trim();
    if diff.is_empty() {
        return TruncatedDiff::default();
    }

    let mut kept = Vec::new();
    let mut original_len = 0;
    let mut truncated_paths = Vec::new();

    for chunk in split_by_file(diff) {
        if is_binary_chunk(&chunk.content) {
            continue;
        }
        let len = chunk.content.len();
        original_len += len;

        if per_file_limit > 0 && len > per_file_limit {
            kept.push(cap_chunk(&chunk, per_file_limit));
            if let Some(path) = chunk.path {
                truncated_paths.push(path);
            }
        } else {
            kept.push(chunk.content);
        }
    }

    TruncatedDiff {
        text: kept.join("\n"),
        original_len,
        truncated_paths,
    }
}

fn cap_chunk(chunk: &DiffChunk, limit: usize) -> String {
    let total = chunk.content.len();
    let head_len = limit / 2;
    let tail_len = limit - head_len;
    let path = chunk.path.as_deref().unwrap_or_default();
    format!(
        "{}\n[commitsmith] diff truncated for {path}: showing first {head_len} and last {tail_len} chars of {total} total\n{}",
        text::head(&chunk.content, head_len),
        text::tail(&chunk.content, tail_len),
    )
}
