//! Configuration loading.
//!
//! Settings come from `$HOME/.config/commitsmith/config.yaml` (or the path
//! given with `--config`), are overridden by `COMMITSMITH_*` environment
//! variables, and finally by command-line flags. The file's `env` map acts
//! as a fallback for environment variables such as API keys.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::ai::error::AiError;
use crate::prompt::compose::Style;
use crate::prompt::variants::DEFAULT_CAPPED_CHARS;

/// Model provider, all spoken to through an OpenAI-compatible API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// api.openai.com
    #[default]
    #[value(name = "openai")]
    OpenAi,
    /// openrouter.ai
    #[value(name = "openrouter")]
    OpenRouter,
    /// An Anthropic OpenAI-compatible endpoint; needs an explicit base URL.
    Anthropic,
}

impl Provider {
    /// Lowercase provider name.
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Anthropic => "anthropic",
        }
    }

    /// Base URL used when none is configured.
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Anthropic => None,
        }
    }

    /// Environment variables searched for the API key, in order.
    pub fn api_key_vars(self) -> [&'static str; 2] {
        let specific = match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        };
        [specific, "COMMITSMITH_API_KEY"]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!("unsupported provider '{other}'")),
        }
    }
}

/// Resolved tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider.
    pub provider: Provider,
    /// Model identifier; required before a request can be sent.
    pub model: Option<String>,
    /// API base URL; the provider default when unset.
    pub base_url: Option<String>,
    /// Commit message style.
    pub style: Style,
    /// Total diff size above which a multi-commit plan is requested.
    pub split_threshold: usize,
    /// Per-file diff cap in bytes, 0 for none.
    #[serde(deserialize_with = "non_negative")]
    pub per_file_limit: usize,
    /// Whole-prompt cap in bytes, 0 for none.
    #[serde(deserialize_with = "non_negative")]
    pub max_prompt_chars: usize,
    /// Size of the capped per-file rendering under a prompt budget.
    pub capped_variant_chars: usize,
    /// Spinner frame interval in milliseconds.
    pub spinner_interval_ms: u64,
    /// `HTTP-Referer` sent to OpenRouter.
    pub openrouter_referer: Option<String>,
    /// `X-Title` sent to OpenRouter.
    pub openrouter_title: Option<String>,
    /// Fallback values for environment variables.
    pub env: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            base_url: None,
            style: Style::default(),
            split_threshold: 200_000,
            per_file_limit: 20_000,
            max_prompt_chars: 100_000,
            capped_variant_chars: DEFAULT_CAPPED_CHARS,
            spinner_interval_ms: 120,
            openrouter_referer: None,
            openrouter_title: None,
            env: HashMap::new(),
        }
    }
}

/// Negative limits mean "no limit" and are stored as 0.
fn non_negative<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value).unwrap_or(0))
}

fn parse_limit(value: &str) -> Option<usize> {
    value
        .parse::<i64>()
        .ok()
        .map(|v| usize::try_from(v).unwrap_or(0))
}

impl Config {
    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir
            .join(".config")
            .join("commitsmith")
            .join("config.yaml"))
    }

    /// Loads the config file at `path`; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
            Ok(meta) if meta.is_dir() => {
                bail!("Config path is a directory: {}", path.display())
            }
            Ok(_) => {}
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Applies `COMMITSMITH_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Blank values are skipped and
    /// unparsable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get("COMMITSMITH_PROVIDER") {
            match value.parse() {
                Ok(provider) => self.provider = provider,
                Err(err) => warn!(key = "COMMITSMITH_PROVIDER", "ignoring override: {err}"),
            }
        }
        if let Some(value) = get("COMMITSMITH_MODEL") {
            self.model = Some(value);
        }
        if let Some(value) = get("COMMITSMITH_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Some(value) = get("COMMITSMITH_STYLE") {
            match value.parse() {
                Ok(style) => self.style = style,
                Err(err) => warn!(key = "COMMITSMITH_STYLE", "ignoring override: {err}"),
            }
        }
        if let Some(value) = get("COMMITSMITH_SPLIT_THRESHOLD") {
            match value.parse() {
                Ok(threshold) => self.split_threshold = threshold,
                Err(_) => warn!(key = "COMMITSMITH_SPLIT_THRESHOLD", %value, "ignoring non-numeric override"),
            }
        }
        for (key, target) in [
            ("COMMITSMITH_PER_FILE_LIMIT", &mut self.per_file_limit),
            ("COMMITSMITH_MAX_PROMPT_CHARS", &mut self.max_prompt_chars),
        ] {
            if let Some(value) = get(key) {
                match parse_limit(&value) {
                    Some(limit) => *target = limit,
                    None => warn!(key, %value, "ignoring non-numeric override"),
                }
            }
        }
        // The unprefixed OpenRouter variables win over the prefixed ones.
        for key in ["COMMITSMITH_OPENROUTER_REFERER", "OPENROUTER_REFERER"] {
            if let Some(value) = get(key) {
                self.openrouter_referer = Some(value);
            }
        }
        for key in ["COMMITSMITH_OPENROUTER_TITLE", "OPENROUTER_TITLE"] {
            if let Some(value) = get(key) {
                self.openrouter_title = Some(value);
            }
        }
    }

    /// Returns an environment variable with fallback to the `env` map.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        self.lookup_with(|k| env::var(k).ok(), key)
    }

    fn lookup_with<F>(&self, lookup: F, key: &str) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(key)
            .or_else(|| self.env.get(key).cloned())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Finds the API key for the configured provider.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(|key| env::var(key).ok())
    }

    /// Like [`resolve_api_key`](Self::resolve_api_key) with an explicit
    /// environment.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = self.provider.api_key_vars();
        vars.iter()
            .find_map(|key| self.lookup_with(&lookup, key))
            .ok_or_else(|| {
                AiError::ApiKeyNotFound {
                    provider: self.provider.to_string(),
                    vars: vars.join(" or "),
                }
                .into()
            })
    }

    /// Returns the configured model, failing when none is set.
    pub fn require_model(&self) -> Result<String> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Model is required; set --model, COMMITSMITH_MODEL or `model` in the config file"))
    }

    /// Returns the validated base URL without a trailing slash.
    pub fn resolved_base_url(&self) -> Result<String> {
        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| self.provider.default_base_url())
            .ok_or_else(|| anyhow!("Base URL is required for provider {}", self.provider))?;
        url::Url::parse(base).with_context(|| format!("Invalid base URL: {base}"))?;
        Ok(base.trim_end_matches('/').to_string())
    }

    /// Extra request headers for the provider.
    pub fn extra_headers(&self) -> Vec<(String, String)> {
        if self.provider != Provider::OpenRouter {
            return Vec::new();
        }
        let mut headers = Vec::new();
        if let Some(referer) = &self.openrouter_referer {
            headers.push(("HTTP-Referer".to_string(), referer.clone()));
        }
        if let Some(title) = &self.openrouter_title {
            headers.push(("X-Title".to_string(), title.clone()));
        }
        headers
    }

    /// Spinner frame interval.
    pub fn spinner_interval(&self) -> Duration {
        Duration::from_millis(self.spinner_interval_ms.max(1))
    }
}
