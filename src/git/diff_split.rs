//! Per-file unified diff splitting and path recovery.

/// Marker that begins a per-file section in unified diff output.
pub(crate) const FILE_DIFF_MARKER: &str = "diff --git ";

/// Path git prints for the missing side of an added or deleted file.
pub(crate) const NULL_DEVICE: &str = "/dev/null";

/// Marker that begins a hunk within a file diff.
const HUNK_MARKER: &str = "@@ ";

/// A per-file slice of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChunk {
    /// Path of the file, when it can be recovered from the chunk's headers.
    pub path: Option<String>,
    /// Raw text of this file's diff, without the newline that separates it
    /// from the next chunk.
    pub content: String,
}

impl DiffChunk {
    /// Returns the chunk's path, or `unknown-N` for its 1-based `position`.
    pub fn display_path(&self, position: usize) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("unknown-{position}"))
    }

    /// Returns the first line of the chunk (the `diff --git` header for
    /// every chunk but a leading preamble).
    pub fn header_line(&self) -> &str {
        first_line(&self.content)
    }
}

/// Splits a flat unified diff at `diff --git ` line boundaries.
///
/// Text before the first header becomes its own leading chunk, and text with
/// no header at all is returned as a single chunk. Empty input returns an
/// empty `Vec`. Joining the chunk contents with `"\n"` reproduces the input
/// exactly.
pub fn split_by_file(diff: &str) -> Vec<DiffChunk> {
    if diff.is_empty() {
        return Vec::new();
    }

    // Section starts, at line boundaries. Position 0 always opens a chunk:
    // either a header or the preamble before the first one.
    let mut positions = vec![0];
    let search = format!("\n{FILE_DIFF_MARKER}");
    let mut start = 0;
    while let Some(pos) = diff[start..].find(&search) {
        // +1 to skip the newline; the section starts at `diff`.
        start = start + pos + 1;
        positions.push(start);
    }

    positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| {
            // The separating newline belongs to neither neighbour.
            let end = positions.get(i + 1).map_or(diff.len(), |next| next - 1);
            let content = &diff[pos..end];
            DiffChunk {
                path: extract_path(content),
                content: content.to_string(),
            }
        })
        .collect()
}

/// Recovers the file path of one chunk.
///
/// The `b/` side of the `diff --git` header wins; deletions (whose new side
/// is `/dev/null`) fall back to the `a/` side. When the header is missing or
/// unparsable, the `+++ ` and `--- ` lines before the first hunk are used.
pub fn extract_path(chunk: &str) -> Option<String> {
    first_line(chunk)
        .strip_prefix(FILE_DIFF_MARKER)
        .and_then(path_from_header)
        .or_else(|| path_from_file_lines(chunk))
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

fn path_from_header(rest: &str) -> Option<String> {
    let rest = rest.trim_end();
    if rest.starts_with('"') || rest.ends_with('"') {
        return quoted_header_paths(rest);
    }
    // Format: "a/old_path b/new_path".
    // Find the last " b/" to handle paths that may contain spaces.
    let (old, new) = match rest.rfind(" b/") {
        Some(pos) => (&rest[..pos], &rest[pos + 3..]),
        None => rest.split_once(' ')?,
    };
    let old = old.strip_prefix("a/").unwrap_or(old);
    pick_side(old, new)
}

/// Header whose sides git C-quoted, e.g. `"a/tab\there" "b/tab\there"`.
/// Either side may be quoted on its own.
fn quoted_header_paths(rest: &str) -> Option<String> {
    let (old, new) = if rest.starts_with('"') {
        let (old, tail) = unquote_prefix(rest)?;
        let tail = tail.strip_prefix(' ')?;
        let new = if tail.starts_with('"') {
            unquote_prefix(tail)?.0
        } else {
            tail.to_string()
        };
        (old, new)
    } else {
        let pos = rest.rfind(" \"")?;
        (rest[..pos].to_string(), unquote_prefix(&rest[pos + 1..])?.0)
    };
    let old = old.strip_prefix("a/").unwrap_or(&old);
    let new = new.strip_prefix("b/").unwrap_or(&new);
    pick_side(old, new)
}

fn pick_side(old: &str, new: &str) -> Option<String> {
    let path = if new == NULL_DEVICE { old } else { new };
    (!path.is_empty() && path != NULL_DEVICE).then(|| path.to_string())
}

fn path_from_file_lines(chunk: &str) -> Option<String> {
    let mut old = None;
    let mut new = None;
    for line in chunk.split('\n') {
        if line.starts_with(HUNK_MARKER) {
            break;
        }
        if let Some(path) = line.strip_prefix("--- ") {
            old.get_or_insert_with(|| unquote(path.trim_end()));
        } else if let Some(path) = line.strip_prefix("+++ ") {
            new.get_or_insert_with(|| unquote(path.trim_end()));
        }
    }

    let usable = |path: &String| !path.is_empty() && path != NULL_DEVICE;
    if let Some(path) = new.filter(usable) {
        return Some(path.strip_prefix("b/").unwrap_or(&path).to_string());
    }
    old.filter(usable)
        .map(|path| path.strip_prefix("a/").unwrap_or(&path).to_string())
}

/// Decodes a path git may have C-quoted; unquoted input is returned as is.
fn unquote(path: &str) -> String {
    match unquote_prefix(path) {
        Some((decoded, "")) => decoded,
        _ => path.to_string(),
    }
}

/// Decodes the C-quoted string at the start of `text` and returns it along
/// with the rest of the input. `None` if `text` does not open with a
/// well-formed quoted string.
///
/// Octal escapes are raw bytes (usually UTF-8 sequences), so the decoded
/// bytes are collected first and converted at the end.
fn unquote_prefix(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix('"')?;
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let decoded = String::from_utf8_lossy(&out).into_owned();
                return Some((decoded, &body[i + 1..]));
            }
            b'\\' => {
                let escaped = *bytes.get(i + 1)?;
                i += 2;
                let byte = match escaped {
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'v' => 0x0b,
                    b'0'..=b'3' => {
                        let digits = bytes.get(i - 1..i + 2)?;
                        i += 2;
                        digits.iter().try_fold(0u8, |acc, d| match d {
                            b'0'..=b'7' => Some(acc * 8 + (d - b'0')),
                            _ => None,
                        })?
                    }
                    b'"' | b'\\' => escaped,
                    _ => return None,
                };
                out.push(byte);
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    None
}
