//! One run of the tool: collected changes plus the interactive loop.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::ai::AiClient;
use crate::config::Config;
use crate::git::collect::{collect_diff, DiffResult, Scope};
use crate::git::commit::commit_with_message;
use crate::git::diff_split::split_by_file;
use crate::prompt::compose::{listed_files, PromptComposer, PromptMode, SYSTEM_PROMPT};
use crate::ui;
use crate::utils::Spinner;

/// How an interactive run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A commit was created.
    Committed,
    /// The user accepted a split plan; nothing was committed.
    PlanAccepted,
    /// The user cancelled.
    Cancelled,
}

/// Collected changes for one repository and scope.
pub struct Session {
    root: PathBuf,
    scope: Scope,
    config: Config,
    result: DiffResult,
    editor: Option<String>,
}

impl Session {
    /// Collects the diff for `scope`, failing when there is nothing to commit.
    pub fn collect(root: PathBuf, scope: Scope, config: Config) -> Result<Self> {
        let result = collect_diff(&root, scope, config.per_file_limit)?;
        if result.is_empty() {
            bail!("no changes found for selected diff scope");
        }
        debug!(
            scope = %scope,
            diff_len = result.diff.len(),
            total_original_len = result.total_original_len,
            binary_count = result.binary_files.len(),
            truncated_count = result.truncated_paths.len(),
            "Collected changes"
        );
        Ok(Self {
            root,
            scope,
            config,
            result,
            editor: ui::editor::editor_from_env(),
        })
    }

    /// Overrides the editor command used for the edit action.
    #[must_use]
    pub fn with_editor(mut self, editor: Option<String>) -> Self {
        self.editor = editor;
        self
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The collected changes.
    pub fn result(&self) -> &DiffResult {
        &self.result
    }

    /// Decides whether to ask for one message or a split plan.
    ///
    /// `--accept` without `--split` always asks for one message.
    pub fn choose_mode(&self, single: bool, split: bool, accept: bool) -> PromptMode {
        let large = self.result.total_original_len > self.config.split_threshold;
        if split || (large && !single && !accept) {
            PromptMode::Split
        } else {
            PromptMode::Single
        }
    }

    /// Builds the user prompt for `mode`.
    pub fn compose(&self, mode: PromptMode) -> String {
        let prompt = PromptComposer::new(self.config.style, self.scope)
            .with_max_chars(self.config.max_prompt_chars)
            .with_capped_chars(self.config.capped_variant_chars)
            .compose(mode, &self.result);
        if prompt.partial {
            warn!(
                max_prompt_chars = self.config.max_prompt_chars,
                "Prompt budget is too small to list every changed file"
            );
        }
        prompt.text
    }

    /// Paths shown in the "Files to be committed" box.
    pub fn files(&self) -> Vec<String> {
        let chunks = split_by_file(self.result.diff.trim());
        listed_files(&chunks, &self.result.binary_files)
    }

    async fn request(&self, client: &dyn AiClient, mode: PromptMode) -> Result<String> {
        let prompt = self.compose(mode);
        let label = match mode {
            PromptMode::Single => "Generating commit message",
            PromptMode::Split => "Generating commit plan",
        };
        let spinner = Spinner::start(label, self.config.spinner_interval());
        let response = client.send_request(SYSTEM_PROMPT, &prompt).await;
        spinner.stop();
        response
    }

    /// Runs the request/review loop until the user commits or gives up.
    pub async fn run_with_io<R, W>(
        &self,
        client: &dyn AiClient,
        mode: PromptMode,
        accept: bool,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<Outcome>
    where
        R: BufRead + ?Sized,
        W: Write + ?Sized,
    {
        if mode == PromptMode::Split {
            let plan = self.request(client, PromptMode::Split).await?;
            show(writer, "Proposed commit plan:", &plan)?;
            if accept {
                return Ok(Outcome::PlanAccepted);
            }

            let options = [
                ('a', "accept plan and exit"),
                ('f', "force single commit message"),
                ('c', "cancel"),
            ];
            match ui::prompt_choice(reader, writer, "Split-mode options", &options)? {
                'a' => return Ok(Outcome::PlanAccepted),
                'f' => {}
                _ => return Ok(Outcome::Cancelled),
            }
        }

        loop {
            let message = self.request(client, PromptMode::Single).await?;
            show(writer, "Proposed commit message:", &message)?;

            if accept {
                return self.commit(writer, &message);
            }

            let options = [('a', "accept"), ('e', "edit"), ('r', "retry"), ('c', "cancel")];
            match ui::prompt_choice(reader, writer, "Choose action", &options)? {
                'a' => return self.commit(writer, &message),
                'e' => {
                    let edited =
                        ui::edit_message(self.editor.as_deref(), reader, writer, &message)?;
                    if edited.is_empty() {
                        bail!("empty commit message after edit");
                    }
                    return self.commit(writer, &edited);
                }
                'r' => continue,
                _ => return Ok(Outcome::Cancelled),
            }
        }
    }

    fn commit<W: Write + ?Sized>(&self, writer: &mut W, message: &str) -> Result<Outcome> {
        if message.trim().is_empty() {
            bail!("empty commit message");
        }
        commit_with_message(&self.root, message, self.scope)?;
        writeln!(writer, "Commit created.")?;
        Ok(Outcome::Committed)
    }
}

fn show<W: Write + ?Sized>(writer: &mut W, title: &str, body: &str) -> Result<()> {
    writeln!(writer, "{title}")?;
    writeln!(writer, "---")?;
    writeln!(writer, "{body}")?;
    writeln!(writer, "---")?;
    writer.flush()?;
    Ok(())
}
