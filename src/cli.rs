//! Command-line interface for commitsmith.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::ai::OpenAiClient;
use crate::config::{Config, Provider};
use crate::git::collect::Scope;
use crate::git::command::repo_root;
use crate::prompt::compose::{Style, SYSTEM_PROMPT};
use crate::ui;

pub mod session;

pub use session::{Outcome, Session};

/// commitsmith: commit messages written by a language model from your diff.
#[derive(Parser, Debug, Default)]
#[command(name = "commitsmith")]
#[command(about = "Generate git commit messages from your changes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Includes unstaged changes to tracked files.
    #[arg(short = 'u', long)]
    pub include_unstaged: bool,

    /// Includes unstaged changes and untracked files.
    #[arg(short = 'A', long)]
    pub include_all: bool,

    /// Forces a single message even if the diff is large.
    #[arg(short = 's', long, conflicts_with = "split")]
    pub single: bool,

    /// Forces a split-mode commit plan.
    #[arg(short = 'S', long)]
    pub split: bool,

    /// Accepts the proposed result without asking.
    #[arg(short = 'f', long)]
    pub accept: bool,

    /// Prints the model request as JSON and exits.
    #[arg(short = 'd', long)]
    pub dump_context: bool,

    /// Maximum characters for the user prompt (0 = no limit).
    #[arg(long, value_name = "CHARS")]
    pub max_prompt_chars: Option<usize>,

    /// Model provider.
    #[arg(short = 'p', long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (required unless set in config or environment).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(short = 'b', long)]
    pub base_url: Option<String>,

    /// Commit message style.
    #[arg(short = 't', long, value_enum)]
    pub style: Option<Style>,

    /// Path to the config file.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// OpenRouter HTTP-Referer header.
    #[arg(short = 'r', long)]
    pub openrouter_referer: Option<String>,

    /// OpenRouter X-Title header.
    #[arg(short = 'T', long)]
    pub openrouter_title: Option<String>,
}

impl Cli {
    /// Diff scope selected by the flags.
    pub fn scope(&self) -> Scope {
        if self.include_all {
            Scope::All
        } else if self.include_unstaged {
            Scope::StagedUnstaged
        } else {
            Scope::Staged
        }
    }

    /// Applies flag values on top of `config`. Blank strings are ignored.
    pub fn apply_to(&self, config: &mut Config) {
        fn non_blank(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(model) = non_blank(self.model.as_deref()) {
            config.model = Some(model);
        }
        if let Some(base_url) = non_blank(self.base_url.as_deref()) {
            config.base_url = Some(base_url);
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(max) = self.max_prompt_chars {
            config.max_prompt_chars = max;
        }
        if let Some(referer) = non_blank(self.openrouter_referer.as_deref()) {
            config.openrouter_referer = Some(referer);
        }
        if let Some(title) = non_blank(self.openrouter_title.as_deref()) {
            config.openrouter_title = Some(title);
        }
    }

    /// Loads configuration: file, then environment, then flags.
    pub fn load_config(&self) -> Result<Config> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::default_path()?,
        };
        debug!(path = %path.display(), "Loading config");
        let mut config = Config::load_from_path(&path)?;
        config.apply_env_overrides();
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        let base_url = config.resolved_base_url()?;
        let model = config.require_model()?;
        let api_key = config.resolve_api_key()?;

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let root = repo_root(&cwd)?;

        let client = OpenAiClient::new(
            config.provider.name(),
            model,
            api_key,
            &base_url,
            config.extra_headers(),
        )?;
        let session = Session::collect(root, self.scope(), config)?;
        let mode = session.choose_mode(self.single, self.split, self.accept);
        debug!(?mode, scope = %self.scope(), "Selected prompt mode");

        if self.dump_context {
            let prompt = session.compose(mode);
            println!("{}", client.render_request(SYSTEM_PROMPT, &prompt)?);
            return Ok(());
        }

        let mut stdout = io::stdout();
        ui::display_file_box(&mut stdout, &session.files())?;
        stdout.flush()?;

        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let outcome = session
            .run_with_io(&client, mode, self.accept, &mut reader, &mut stdout)
            .await?;
        debug!(?outcome, "Finished");
        Ok(())
    }
}
