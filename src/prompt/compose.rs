//! Final prompt assembly.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::git::binary::BinaryFile;
use crate::git::collect::{DiffResult, Scope};
use crate::git::diff_split::{split_by_file, DiffChunk};
use crate::prompt::budget::allocate;
use crate::prompt::variants::{ChunkVariants, DEFAULT_CAPPED_CHARS};
use crate::utils::text;

/// System prompt sent with every request.
pub const SYSTEM_PROMPT: &str =
    "You are a senior software engineer who writes precise git commit messages.";

/// Marker inserted when the prompt itself has to be cut.
pub(crate) const PROMPT_MARKER: &str = "\n[commitsmith] prompt truncated to fit max_prompt_chars\n";

const CONVENTIONAL_RULES: &str = "Use Conventional Commits. Format: type(scope): summary. Summary <= 72 chars, imperative, no trailing period.\n\
Allowed types: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert.\n\
Include body if useful, separated by a blank line.\n";

const CONVENTIONAL_PLAN_RULES: &str =
    "Use Conventional Commits for each message. Format: type(scope): summary.\n";

const FREEFORM_RULES: &str =
    "Write a concise summary line (<= 72 chars) and an optional body if helpful.\n";

const FREEFORM_PLAN_RULES: &str =
    "Use concise commit messages with summary line and optional body.\n";

const PLAN_REQUIREMENTS: &str = "Return a plan with:\n\
1) Total number of commits\n\
2) For each commit: message, short rationale, and affected files or areas\n";

const BUDGET_NOTE: &str = "\nNote: diff detail may be reduced to fit max_prompt_chars.\n";

/// Commit message style requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// `type(scope): summary` messages.
    #[default]
    Conventional,
    /// A plain summary line and optional body.
    Freeform,
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conventional" => Ok(Self::Conventional),
            "freeform" => Ok(Self::Freeform),
            other => Err(format!("unknown style '{other}' (expected conventional or freeform)")),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Conventional => "conventional",
            Self::Freeform => "freeform",
        })
    }
}

/// What the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// One commit message.
    Single,
    /// A multi-commit plan.
    Split,
}

impl PromptMode {
    fn instruction(self) -> &'static str {
        match self {
            Self::Single => "Generate a git commit message for the following changes.\n",
            Self::Split => "The diff is large. Propose a coherent multi-commit plan.\n",
        }
    }

    fn closing(self) -> &'static str {
        match self {
            Self::Single => "\n\nReturn only the commit message, no code fences or extra commentary.",
            Self::Split => "\n\nReturn only the plan, no code fences or extra commentary.",
        }
    }

    fn rules(self, style: Style) -> &'static str {
        match (self, style) {
            (Self::Single, Style::Conventional) => CONVENTIONAL_RULES,
            (Self::Single, Style::Freeform) => FREEFORM_RULES,
            (Self::Split, Style::Conventional) => CONVENTIONAL_PLAN_RULES,
            (Self::Split, Style::Freeform) => FREEFORM_PLAN_RULES,
        }
    }
}

/// A prompt ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// The user prompt text.
    pub text: String,
    /// `true` when the budget could not name every changed file.
    pub partial: bool,
}

/// Builds user prompts from a [`DiffResult`].
#[derive(Debug, Clone)]
pub struct PromptComposer {
    style: Style,
    scope: Scope,
    max_chars: usize,
    capped_chars: usize,
}

impl PromptComposer {
    /// Creates an unbudgeted composer.
    pub fn new(style: Style, scope: Scope) -> Self {
        Self {
            style,
            scope,
            max_chars: 0,
            capped_chars: DEFAULT_CAPPED_CHARS,
        }
    }

    /// Limits the whole prompt to `max_chars` bytes (`0` = no limit).
    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Sets the size of the capped per-file rendering used under a budget.
    #[must_use]
    pub fn with_capped_chars(mut self, capped_chars: usize) -> Self {
        self.capped_chars = capped_chars;
        self
    }

    /// Composes the prompt for `mode`.
    pub fn compose(&self, mode: PromptMode, result: &DiffResult) -> ComposedPrompt {
        if self.max_chars == 0 {
            let text = format!(
                "{}{}{}",
                self.preamble(mode, result, None),
                result.diff,
                mode.closing()
            );
            return ComposedPrompt {
                text,
                partial: false,
            };
        }
        self.compose_budgeted(mode, result)
    }

    fn compose_budgeted(&self, mode: PromptMode, result: &DiffResult) -> ComposedPrompt {
        let chunks = split_by_file(result.diff.trim());
        let files = listed_files(&chunks, &result.binary_files);
        let preamble = self.preamble(mode, result, Some(&files));
        let closing = mode.closing();

        let fixed = preamble.len() + closing.len();
        if fixed > self.max_chars {
            debug!(fixed, max_chars = self.max_chars, "instructions alone exceed the budget");
            return ComposedPrompt {
                text: text::elide_middle(&format!("{preamble}{closing}"), self.max_chars, PROMPT_MARKER),
                partial: !chunks.is_empty(),
            };
        }

        let variants: Vec<ChunkVariants> = chunks
            .iter()
            .map(|chunk| ChunkVariants::build(&chunk.content, self.capped_chars))
            .collect();
        let allocation = allocate(&variants, self.max_chars - fixed);
        debug!(
            chunks = chunks.len(),
            diff_budget = self.max_chars - fixed,
            body_len = allocation.body.len(),
            partial = allocation.partial,
            "allocated diff body"
        );

        let mut text = format!("{preamble}{}{closing}", allocation.body);
        if text.len() > self.max_chars {
            text = text::elide_middle(&text, self.max_chars, PROMPT_MARKER);
        }
        ComposedPrompt {
            text,
            partial: allocation.partial,
        }
    }

    /// Everything up to and including the `Diff:` heading. `files` is only
    /// given in budgeted mode.
    fn preamble(&self, mode: PromptMode, result: &DiffResult, files: Option<&[String]>) -> String {
        let mut out = String::new();
        out.push_str(mode.instruction());
        out.push_str(&format!("Diff scope: {}.\n\n", self.scope.label()));
        out.push_str(mode.rules(self.style));
        if mode == PromptMode::Split {
            out.push_str(PLAN_REQUIREMENTS);
        }
        if files.is_some() {
            out.push_str(BUDGET_NOTE);
        }

        if !result.truncated_paths.is_empty() {
            let mut truncated = result.truncated_paths.clone();
            truncated.sort();
            out.push_str("\nNote: some file diffs were truncated due to size:\n");
            for path in &truncated {
                out.push_str(&format!("- {path}\n"));
            }
        }

        if !result.binary_files.is_empty() {
            let mut binaries: Vec<&BinaryFile> = result.binary_files.iter().collect();
            binaries.sort_by(|a, b| a.path.cmp(&b.path));
            out.push_str("\nBinary files changed (content omitted):\n");
            for file in binaries {
                out.push_str(&format!("- {} ({})\n", file.path, file.size_label()));
            }
        }

        if let Some(files) = files.filter(|files| !files.is_empty()) {
            out.push_str("\nFiles changed (all):\n");
            for file in files {
                out.push_str(&format!("- {file}\n"));
            }
        }

        out.push_str("\nDiff:\n");
        out
    }
}

/// Lists every changed file once: diff chunks in order, then binary files
/// that have no chunk, sorted by path. Binary paths carry a ` (binary)`
/// suffix.
pub fn listed_files(chunks: &[DiffChunk], binaries: &[BinaryFile]) -> Vec<String> {
    let mut binary_paths: Vec<&str> = binaries.iter().map(|b| b.path.as_str()).collect();
    binary_paths.sort_unstable();
    let binary_set: HashSet<&str> = binary_paths.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let chunk_paths = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| chunk.display_path(i + 1));
    for path in chunk_paths.chain(binary_paths.iter().map(|p| (*p).to_string())) {
        if !seen.insert(path.clone()) {
            continue;
        }
        if binary_set.contains(path.as_str()) {
            out.push(format!("{path} (binary)"));
        } else {
            out.push(path);
        }
    }
    out
}
