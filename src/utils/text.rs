//! Byte-budget helpers that cut text at UTF-8 character boundaries.
//!
//! Every length in this crate is a byte length (`str::len`). These helpers
//! never split a character: a requested cut inside a multi-byte sequence is
//! moved inwards, so the kept text may be up to three bytes shorter than
//! asked for but is never longer.

/// Returns the longest prefix of `text` that is at most `max` bytes long.
pub fn head(text: &str, max: usize) -> &str {
    if max >= text.len() {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Returns the longest suffix of `text` that is at most `max` bytes long.
pub fn tail(text: &str, max: usize) -> &str {
    if max >= text.len() {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Shortens `text` to at most `max` bytes by keeping its head and tail
/// around `marker`.
///
/// `max == 0` means "no limit". Text that already fits is returned
/// unchanged. When `max` cannot hold the marker plus a couple of bytes of
/// content, the text is simply cut to `max` bytes.
pub fn elide_middle(text: &str, max: usize, marker: &str) -> String {
    if max == 0 || text.len() <= max {
        return text.to_string();
    }
    if max <= marker.len() + 2 {
        return head(text, max).to_string();
    }
    let keep = max - marker.len();
    let head_len = keep / 2;
    let tail_len = keep - head_len;
    format!("{}{marker}{}", head(text, head_len), tail(text, tail_len))
}
