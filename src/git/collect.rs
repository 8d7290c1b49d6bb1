//! Scope-tiered diff collection.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::git::binary::{self, BinaryFile};
use crate::git::command::{run_git, run_git_allowing, DIFF_EXIT_CODES, VERBATIM_PATHS};
use crate::git::diff_split::NULL_DEVICE;
use crate::git::truncate::truncate_diff;

/// How much of the working tree is considered. Each scope includes every
/// narrower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Scope {
    /// Staged changes only.
    #[default]
    Staged,
    /// Staged changes plus unstaged changes to tracked files.
    StagedUnstaged,
    /// Everything, including untracked files.
    All,
}

impl Scope {
    /// Human label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Staged => "staged only",
            Self::StagedUnstaged => "staged + unstaged",
            Self::All => "staged + unstaged + untracked",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything collected for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Per-file capped diff text of every tier, joined with newlines.
    pub diff: String,
    /// Binary changes, unique by path and sorted by path.
    pub binary_files: Vec<BinaryFile>,
    /// Paths whose diff was cut, deduplicated in first-seen order.
    pub truncated_paths: Vec<String>,
    /// Total length of all text chunks before any cap was applied.
    pub total_original_len: usize,
}

impl DiffResult {
    /// Returns `true` when there is neither diff text nor a binary change.
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty() && self.binary_files.is_empty()
    }
}

/// Collects the diff for `scope` in the repository at `root`.
///
/// Tiers run in order: staged, unstaged, then untracked files. Each tier's
/// output is capped per file at `per_file_limit` bytes (`0` = no cap). Any
/// unexpected git status aborts the whole collection.
pub fn collect_diff(root: &Path, scope: Scope, per_file_limit: usize) -> Result<DiffResult> {
    let mut acc = Accumulator::new(per_file_limit);

    acc.add_binaries(binary::tracked_binary_files(root, true)?);
    acc.add_tier(
        "staged",
        &run_git_allowing(root, DIFF_EXIT_CODES, &diff_args(&["--cached"]))?,
    );

    if scope >= Scope::StagedUnstaged {
        acc.add_binaries(binary::tracked_binary_files(root, false)?);
        acc.add_tier(
            "unstaged",
            &run_git_allowing(root, DIFF_EXIT_CODES, &diff_args(&[]))?,
        );
    }

    if scope == Scope::All {
        for path in list_untracked(root)? {
            if binary::is_binary_file(&root.join(&path)) {
                acc.add_binaries(vec![BinaryFile::at(root, path)]);
                continue;
            }
            let out = run_git_allowing(
                root,
                DIFF_EXIT_CODES,
                &diff_args(&["--no-index", "--", NULL_DEVICE, path.as_str()]),
            )?;
            acc.add_tier("untracked", &out);
        }
    }

    Ok(acc.finish())
}

/// Lists untracked, non-ignored files relative to `root`.
pub fn list_untracked(root: &Path) -> Result<Vec<String>> {
    let mut args = VERBATIM_PATHS.to_vec();
    args.extend(["ls-files", "--others", "--exclude-standard", "-z"]);
    let out = run_git(root, &args)?;
    Ok(out
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect())
}

fn diff_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args: Vec<&'a str> = VERBATIM_PATHS.to_vec();
    args.extend(["diff", "--no-color", "--no-ext-diff"]);
    args.extend_from_slice(extra);
    args
}

/// Running totals across tiers.
struct Accumulator {
    per_file_limit: usize,
    sections: Vec<String>,
    binaries: BTreeMap<String, BinaryFile>,
    truncated: Vec<String>,
    total_original_len: usize,
}

impl Accumulator {
    fn new(per_file_limit: usize) -> Self {
        Self {
            per_file_limit,
            sections: Vec::new(),
            binaries: BTreeMap::new(),
            truncated: Vec::new(),
            total_original_len: 0,
        }
    }

    /// Records binary entries; a later tier replaces an earlier entry for
    /// the same path.
    fn add_binaries(&mut self, files: Vec<BinaryFile>) {
        for file in files {
            if let Some(previous) = self.binaries.insert(file.path.clone(), file) {
                debug!(path = %previous.path, "binary entry replaced by a later tier");
            }
        }
    }

    fn add_tier(&mut self, tier: &str, raw: &str) {
        let result = truncate_diff(raw, self.per_file_limit);
        debug!(
            tier,
            raw_len = raw.len(),
            kept_len = result.text.len(),
            original_len = result.original_len,
            truncated = result.truncated_paths.len(),
            "collected diff tier"
        );
        self.total_original_len += result.original_len;
        self.truncated.extend(result.truncated_paths);
        if !result.text.is_empty() {
            self.sections.push(result.text);
        }
    }

    fn finish(self) -> DiffResult {
        let mut truncated_paths: Vec<String> = Vec::with_capacity(self.truncated.len());
        for path in self.truncated {
            if !path.is_empty() && !truncated_paths.contains(&path) {
                truncated_paths.push(path);
            }
        }
        DiffResult {
            diff: self.sections.join("\n"),
            binary_files: self.binaries.into_values().collect(),
            truncated_paths,
            total_original_len: self.total_original_len,
        }
    }
}
