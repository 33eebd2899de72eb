//! Configuration for meeting-actions.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of these settings)
//! 2. Environment variables (a `.env` file is loaded into the environment first)
//! 3. Config file (.meeting-actions/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .meeting-actions/config.yaml
//! - Paths in config file are relative to the directory containing .meeting-actions/
//!
//! Secrets (API key, bot token) are read from the environment only.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::openai;
use crate::core::Limits;

pub const CONFIG_DIR: &str = ".meeting-actions";
pub const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub limits: Option<Limits>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Meeting notes directory
    pub directory: Option<String>,
    /// Artifact written by `extract`
    pub output_file: Option<String>,
    /// Directory ensured to exist by `extract`
    pub output_dir: Option<String>,
    /// Artifact read by `notify`
    pub actions_file: Option<String>,
    /// Log file
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Local command to run instead of the OpenAI API
    pub command: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackConfig {
    pub channel: Option<String>,
}

/// Which completion backend to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSettings {
    OpenAi {
        api_key: Option<String>,
        base_url: String,
        model: String,
        max_tokens: u32,
    },
    Command(String),
}

/// Resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub directory: PathBuf,
    pub output_file: PathBuf,
    pub output_dir: PathBuf,
    pub actions_file: PathBuf,
    pub slack_channel: String,
    pub slack_token: Option<String>,
    pub model: ModelSettings,
    pub limits: Limits,
    /// Log file override; each command has its own default
    pub log_file: Option<PathBuf>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Default artifact name for today, e.g. actions_20240105.json
pub fn default_output_file() -> PathBuf {
    PathBuf::from(format!(
        "actions_{}.json",
        chrono::Local::now().format("%Y%m%d")
    ))
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a config-file path relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| anyhow::anyhow!("{} must be a number, got '{}'", key, v))
        })
        .transpose()
}

impl Settings {
    /// Load settings from the process environment and working directory
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::resolve(|key| std::env::var(key).ok(), &cwd)
    }

    /// Resolve settings from an environment lookup and a starting directory
    pub fn resolve(env: impl Fn(&str) -> Option<String>, cwd: &Path) -> Result<Self> {
        let config_file = find_config_file(cwd);
        let file = match &config_file {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        // Project root is the parent of .meeting-actions/
        let base_dir = config_file
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
            .unwrap_or(cwd)
            .to_path_buf();

        let path_setting = |env_key: &str, file_value: &Option<String>| -> Option<PathBuf> {
            env(env_key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or_else(|| file_value.as_deref().map(|p| resolve_path(&base_dir, p)))
        };

        let directory = path_setting("DIRECTORY", &file.paths.directory)
            .unwrap_or_else(|| PathBuf::from("meeting-notes"));
        let output_file =
            path_setting("OUTPUT_FILE", &file.paths.output_file).unwrap_or_else(default_output_file);
        let output_dir =
            path_setting("OUTPUT_DIR", &file.paths.output_dir).unwrap_or_else(|| PathBuf::from("output"));
        let actions_file = path_setting("ACTIONS_FILE", &file.paths.actions_file)
            .unwrap_or_else(|| PathBuf::from("meeting-notes/actions.json"));
        let log_file = path_setting("LOG_FILE", &file.paths.log_file);

        let slack_channel = env("SLACK_CHANNEL")
            .or(file.slack.channel.clone())
            .unwrap_or_else(|| "#actions".to_string());

        let model = match env("LLM_COMMAND").or(file.model.command.clone()) {
            Some(command) if !command.trim().is_empty() => ModelSettings::Command(command),
            _ => ModelSettings::OpenAi {
                api_key: env("OPENAI_API_KEY"),
                base_url: env("OPENAI_BASE_URL")
                    .or(file.model.base_url.clone())
                    .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
                model: env("OPENAI_MODEL")
                    .or(file.model.model.clone())
                    .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
                max_tokens: parse_number("OPENAI_MAX_TOKENS", env("OPENAI_MAX_TOKENS"))?
                    .or(file.model.max_tokens)
                    .unwrap_or(1024),
            },
        };

        let mut limits = file.limits.clone().unwrap_or_default();
        if let Some(v) = parse_number("MODEL_TIMEOUT_SECONDS", env("MODEL_TIMEOUT_SECONDS"))? {
            limits.model_timeout_seconds = v;
        }
        if let Some(v) = parse_number("SEND_TIMEOUT_SECONDS", env("SEND_TIMEOUT_SECONDS"))? {
            limits.send_timeout_seconds = v;
        }
        if let Some(v) = parse_number("MAX_DOCUMENT_BYTES", env("MAX_DOCUMENT_BYTES"))? {
            limits.max_document_bytes = v;
        }

        Ok(Self {
            directory,
            output_file,
            output_dir,
            actions_file,
            slack_channel,
            slack_token: env("SLACK_BOT_TOKEN"),
            model,
            limits,
            log_file,
            config_file,
        })
    }

    /// Human-readable dump with secrets masked
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "config file:   {}",
                self.config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            ),
            format!("directory:     {}", self.directory.display()),
            format!("output file:   {}", self.output_file.display()),
            format!("output dir:    {}", self.output_dir.display()),
            format!("actions file:  {}", self.actions_file.display()),
            format!("slack channel: {}", self.slack_channel),
            format!("slack token:   {}", mask(self.slack_token.as_deref())),
        ];

        match &self.model {
            ModelSettings::OpenAi {
                api_key,
                base_url,
                model,
                max_tokens,
            } => {
                lines.push(format!("model:         openai {} ({} max tokens)", model, max_tokens));
                lines.push(format!("base url:      {}", base_url));
                lines.push(format!("api key:       {}", mask(api_key.as_deref())));
            }
            ModelSettings::Command(command) => {
                lines.push(format!("model:         command `{}`", command));
            }
        }

        lines.push(format!(
            "limits:        model {}s, send {}s, max document {} bytes",
            self.limits.model_timeout_seconds,
            self.limits.send_timeout_seconds,
            self.limits.max_document_bytes
        ));

        lines.join("\n")
    }
}

fn mask(secret: Option<&str>) -> String {
    match secret {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "****".to_string(),
        Some(s) => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}
