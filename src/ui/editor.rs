//! Commit message editing, through `$EDITOR` or inline entry.

use std::fs;
use std::io::{BufRead, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Returns the editor command from `$EDITOR`, if set and non-empty.
pub fn editor_from_env() -> Option<String> {
    std::env::var("EDITOR")
        .ok()
        .map(|editor| editor.trim().to_string())
        .filter(|editor| !editor.is_empty())
}

/// Lets the user edit `initial` and returns the trimmed result.
///
/// Runs `editor` when given, otherwise reads a new message from `reader`
/// until EOF.
pub fn edit_message<R, W>(
    editor: Option<&str>,
    reader: &mut R,
    writer: &mut W,
    initial: &str,
) -> Result<String>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    match editor {
        Some(editor) => edit_in_editor(editor, initial),
        None => inline_edit(reader, writer, initial),
    }
}

/// Opens `initial` in `editor` and reads the file back after it exits.
///
/// The editor command is run through `sh -c`, so it may carry arguments.
pub fn edit_in_editor(editor: &str, initial: &str) -> Result<String> {
    let file = tempfile::Builder::new()
        .prefix("commitsmith-message-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create message file")?;
    fs::write(file.path(), format!("{initial}\n")).context("Failed to write message file")?;

    debug!(editor = editor, path = %file.path().display(), "Launching editor");
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{editor} \"$1\""))
        .arg("sh")
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("Editor '{editor}' exited with {status}");
    }

    let edited = fs::read_to_string(file.path()).context("Failed to read edited message")?;
    Ok(edited.trim().to_string())
}

/// Shows `initial` and reads a replacement message until EOF.
pub fn inline_edit<R, W>(reader: &mut R, writer: &mut W, initial: &str) -> Result<String>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    writeln!(writer, "Enter commit message. End with EOF (Ctrl-D).")?;
    writeln!(writer, "---")?;
    if !initial.is_empty() {
        writeln!(writer, "{initial}")?;
        writeln!(writer, "---")?;
    }
    writer.flush()?;

    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.context("Failed to read message")?);
    }
    Ok(lines.join("\n").trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn inline_edit_reads_until_eof() {
        let mut reader = Cursor::new(b"feat: new title\n\nbody line\n".to_vec());
        let mut out = Vec::new();
        let message = inline_edit(&mut reader, &mut out, "old message").unwrap();

        assert_eq!(message, "feat: new title\n\nbody line");
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Enter commit message. End with EOF (Ctrl-D).\n---\n"));
        assert!(out.contains("old message\n---\n"));
    }

    #[test]
    fn inline_edit_keeps_last_line_without_newline() {
        let mut reader = Cursor::new(b"fix: thing".to_vec());
        let mut out = Vec::new();
        assert_eq!(inline_edit(&mut reader, &mut out, "").unwrap(), "fix: thing");
        assert_eq!(String::from_utf8(out).unwrap().matches("---").count(), 1);
    }

    #[test]
    fn inline_edit_empty_input_gives_empty_message() {
        let mut reader = Cursor::new(b"\n  \n".to_vec());
        let mut out = Vec::new();
        assert_eq!(inline_edit(&mut reader, &mut out, "x").unwrap(), "");
    }

    #[test]
    fn edit_message_without_editor_reads_inline() {
        let mut reader = Cursor::new(b"typed\n".to_vec());
        let mut out = Vec::new();
        assert_eq!(edit_message(None, &mut reader, &mut out, "x").unwrap(), "typed");
    }

    #[test]
    fn edit_message_with_editor_ignores_reader() {
        let mut reader = Cursor::new(b"typed\n".to_vec());
        let mut out = Vec::new();
        let message = edit_message(Some("true"), &mut reader, &mut out, "kept").unwrap();
        assert_eq!(message, "kept");
        assert!(out.is_empty());
    }

    #[test]
    fn editor_output_is_read_back_trimmed() {
        let message = edit_in_editor("printf '  edited message\\n\\n' >", "original").unwrap();
        assert_eq!(message, "edited message");
    }

    #[test]
    fn editor_sees_initial_message() {
        // `true` leaves the file untouched.
        let message = edit_in_editor("true", "keep me").unwrap();
        assert_eq!(message, "keep me");
    }

    #[test]
    fn failing_editor_is_an_error() {
        let err = edit_in_editor("false", "x").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
