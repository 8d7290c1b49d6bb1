//! Binary-file detection for tracked and untracked changes.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::Result;

use crate::git::command::{run_git_allowing, DIFF_EXIT_CODES, VERBATIM_PATHS};

/// Number of leading bytes inspected when classifying an untracked file.
pub const SNIFF_LEN: usize = 8000;

/// A changed file whose content is omitted from the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    /// Repository-relative path.
    pub path: String,
    /// On-disk size in bytes, `None` when the file cannot be stat'ed
    /// (for example because the change deletes it).
    pub size: Option<u64>,
}

impl BinaryFile {
    /// Builds an entry for `path`, reading its size relative to `root`.
    pub fn at(root: &Path, path: String) -> Self {
        let size = file_size(&root.join(&path));
        Self { path, size }
    }

    /// Renders the size as `N bytes` or `unknown`.
    pub fn size_label(&self) -> String {
        match self.size {
            Some(bytes) => format!("{bytes} bytes"),
            None => "unknown".to_string(),
        }
    }
}

/// Returns `true` if `bytes` contain a zero byte or are not valid UTF-8.
pub fn is_binary_content(bytes: &[u8]) -> bool {
    looks_binary(bytes, false)
}

/// Classifies a file by its first [`SNIFF_LEN`] bytes.
///
/// A file that cannot be opened or read is treated as text so that git
/// gets the chance to report on it.
pub fn is_binary_file(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(SNIFF_LEN);
    if file.take(SNIFF_LEN as u64).read_to_end(&mut head).is_err() {
        return false;
    }
    looks_binary(&head, head.len() == SNIFF_LEN)
}

fn looks_binary(bytes: &[u8], window_full: bool) -> bool {
    if bytes.contains(&0) {
        return true;
    }
    match std::str::from_utf8(bytes) {
        Ok(_) => false,
        // error_len() is None when the input merely ends inside a character,
        // which a full sniff window can do to perfectly good text.
        Err(err) => !(window_full && err.error_len().is_none()),
    }
}

/// Returns the size of the file at `path`, or `None` if it cannot be stat'ed.
pub fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|meta| meta.len())
}

/// Lists tracked binary changes using `git diff --numstat -z`.
///
/// `cached` selects the staged tier; otherwise the working tree is compared
/// against the index.
pub fn tracked_binary_files(root: &Path, cached: bool) -> Result<Vec<BinaryFile>> {
    let mut args = VERBATIM_PATHS.to_vec();
    args.extend(["diff", "--numstat", "-z", "--no-color", "--no-ext-diff"]);
    if cached {
        args.push("--cached");
    }
    let output = run_git_allowing(root, DIFF_EXIT_CODES, &args)?;
    Ok(parse_numstat(&output)
        .into_iter()
        .map(|path| BinaryFile::at(root, path))
        .collect())
}

/// Extracts the paths `--numstat -z` output reports as binary (`-` in both
/// count columns).
///
/// Records are NUL-terminated and paths are never quoted. A rename leaves
/// the path field empty and follows it with the old and new paths as two
/// more records; the new path is returned.
pub fn parse_numstat(output: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut records = output.split('\0');
    while let Some(record) = records.next() {
        let mut fields = record.trim_start_matches('\n').splitn(3, '\t');
        let (Some(added), Some(removed), Some(path)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let path = if path.is_empty() {
            // Skip the old path.
            records.nth(1).unwrap_or_default()
        } else {
            path
        };
        if added == "-" && removed == "-" && !path.is_empty() {
            paths.push(path.to_string());
        }
    }
    paths
}
