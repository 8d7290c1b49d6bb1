//! Bordered summary of the files a commit will touch.

use std::io::{IsTerminal, Write};

use anyhow::Result;

/// Files listed before the "... and N more files" line.
pub const MAX_DISPLAY: usize = 5;

const DEFAULT_WIDTH: usize = 80;
const MIN_WIDTH: usize = 50;
const MAX_WIDTH: usize = 100;
const ELLIPSIS: &str = "...";

/// Box width for a terminal of `columns` columns: 80% clamped to 50..=100.
pub fn box_width(columns: Option<u16>) -> usize {
    match columns {
        Some(columns) => (usize::from(columns) * 4 / 5).clamp(MIN_WIDTH, MAX_WIDTH),
        None => DEFAULT_WIDTH,
    }
}

/// Shortens `path` to at most `max_len` characters with a middle ellipsis.
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return ELLIPSIS.to_string();
    }

    let left = (max_len - ELLIPSIS.len()) / 2;
    let right = max_len - ELLIPSIS.len() - left;
    let head: String = path.chars().take(left).collect();
    let tail: String = path.chars().skip(len - right).collect();
    format!("{head}{ELLIPSIS}{tail}")
}

/// Renders the file box for a box of `width` columns between the borders.
pub fn render_file_box(files: &[String], max_display: usize, width: usize) -> String {
    let inner = width.saturating_sub(2);
    let mut lines = vec![format!("Files to be committed ({}):", files.len()), String::new()];
    for file in files.iter().take(max_display) {
        lines.push(format!(" • {}", truncate_path(file, width.saturating_sub(8))));
    }
    if files.len() > max_display {
        lines.push(format!(" • ... and {} more files", files.len() - max_display));
    }

    let rule = "─".repeat(width);
    let mut out = format!("╭{rule}╮\n");
    for line in lines {
        let pad = inner.saturating_sub(line.chars().count());
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("╰{rule}╯\n"));
    out
}

/// Writes the file box sized to the current terminal.
pub fn display_file_box<W: Write + ?Sized>(writer: &mut W, files: &[String]) -> Result<()> {
    let columns = if std::io::stdout().is_terminal() {
        crossterm::terminal::size().ok().map(|(columns, _)| columns)
    } else {
        None
    };
    write!(writer, "{}", render_file_box(files, MAX_DISPLAY, box_width(columns)))?;
    Ok(())
}
