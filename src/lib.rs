//! # commitsmith
//!
//! Generates git commit messages with a language model.
//!
//! ## Features
//!
//! - Collects staged, unstaged and untracked changes from the `git` CLI
//! - Caps oversized per-file diffs and lists binary changes separately
//! - Degrades each file's diff through four renderings to fit a prompt budget
//! - Talks to any OpenAI-compatible chat completions endpoint
//!
//! ## Quick Start
//!
//! ```rust
//! use commitsmith::git::collect::DiffResult;
//! use commitsmith::git::Scope;
//! use commitsmith::prompt::{PromptComposer, PromptMode, Style};
//!
//! let result = DiffResult {
//!     diff: "diff --git a/a.txt b/a.txt\n+hello".to_string(),
//!     total_original_len: 33,
//!     ..DiffResult::default()
//! };
//! let prompt = PromptComposer::new(Style::Conventional, Scope::Staged)
//!     .with_max_chars(2_000)
//!     .compose(PromptMode::Single, &result);
//! assert!(prompt.text.len() <= 2_000);
//! ```

#![warn(missing_docs)]

pub mod ai;
pub mod cli;
pub mod config;
pub mod git;
pub mod prompt;
pub mod ui;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of commitsmith.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
