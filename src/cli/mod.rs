//! Command-line interface for meeting-actions.
//!
//! `extract` turns a directory of meeting notes into an actions artifact,
//! `notify` posts an artifact to Slack, and `config` shows the resolved
//! settings.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use crate::adapters::{ChannelSender, CommandBackend, CompletionBackend, OpenAiBackend, SlackClient};
use crate::config::{ModelSettings, Settings};
use crate::core::{ActionExtractor, CorpusAggregator};
use crate::logging;
use crate::notify::NotificationDispatcher;

const EXTRACT_LOG_FILE: &str = "app.log";
const NOTIFY_LOG_FILE: &str = "slack_notifier.log";

/// meeting-actions - extract action items from meeting notes and post them to Slack
#[derive(Parser, Debug)]
#[command(name = "meeting-actions")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log file (defaults to app.log for extract, slack_notifier.log for notify)
    #[arg(long, global = true, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract action items from every Markdown file in a directory
    Extract {
        /// Meeting notes directory [env: DIRECTORY]
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output JSON file [env: OUTPUT_FILE]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit non-zero if any document failed to extract
        #[arg(long)]
        strict: bool,
    },

    /// Post a saved actions file to a Slack channel
    Notify {
        /// Actions JSON file [env: ACTIONS_FILE]
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Slack channel [env: SLACK_CHANNEL]
        #[arg(short, long)]
        channel: Option<String>,

        /// Exit non-zero if anything could not be posted
        #[arg(long)]
        strict: bool,
    },

    /// Show resolved configuration (secrets masked)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self, settings: Settings) -> Result<ExitCode> {
        let log_file = self.log_file.or_else(|| settings.log_file.clone());

        match self.command {
            Commands::Extract {
                directory,
                output,
                strict,
            } => {
                let _log = logging::init(
                    &log_file.unwrap_or_else(|| PathBuf::from(EXTRACT_LOG_FILE)),
                )?;
                run_extract(&settings, directory, output, strict).await
            }
            Commands::Notify {
                input,
                channel,
                strict,
            } => {
                let _log =
                    logging::init(&log_file.unwrap_or_else(|| PathBuf::from(NOTIFY_LOG_FILE)))?;
                run_notify(&settings, input, channel, strict).await
            }
            Commands::Config => {
                println!("{}", settings.summary());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Build the completion backend selected by the settings
pub fn completion_backend(settings: &Settings) -> Result<Box<dyn CompletionBackend>> {
    match &settings.model {
        ModelSettings::Command(command_line) => {
            Ok(Box::new(CommandBackend::from_command_line(command_line)?))
        }
        ModelSettings::OpenAi {
            api_key,
            base_url,
            model,
            max_tokens,
        } => {
            let api_key = api_key
                .clone()
                .context("OPENAI_API_KEY environment variable required (or set LLM_COMMAND)")?;

            Ok(Box::new(
                OpenAiBackend::new(api_key)
                    .with_base_url(base_url.as_str())
                    .with_model(model.as_str())
                    .with_max_tokens(*max_tokens),
            ))
        }
    }
}

/// Build the Slack sender from the settings
pub fn channel_sender(settings: &Settings) -> Result<Box<dyn ChannelSender>> {
    let token = settings
        .slack_token
        .clone()
        .context("SLACK_BOT_TOKEN environment variable required")?;

    Ok(Box::new(SlackClient::with_timeout(
        token,
        settings.limits.send_timeout(),
    )?))
}

async fn run_extract(
    settings: &Settings,
    directory: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<ExitCode> {
    let directory = directory.unwrap_or_else(|| settings.directory.clone());
    let output = output.unwrap_or_else(|| settings.output_file.clone());

    let backend = completion_backend(settings)
        .inspect_err(|e| error!(error = %e, "Cannot start extraction"))?;
    let extractor = ActionExtractor::new(backend).with_limits(settings.limits.clone());
    info!(backend = extractor.backend_name(), "Using completion backend");

    let report = CorpusAggregator::new(extractor)
        .with_ensure_dir(&settings.output_dir)
        .run(&directory, &output)
        .await
        .inspect_err(|e| error!(error = %e, "Extraction run failed"))?;

    if strict && report.has_failures() {
        warn!(failed = report.files_failed, "{} documents failed", report.files_failed);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_notify(
    settings: &Settings,
    input: Option<PathBuf>,
    channel: Option<String>,
    strict: bool,
) -> Result<ExitCode> {
    let input = input.unwrap_or_else(|| settings.actions_file.clone());
    let channel = channel.unwrap_or_else(|| settings.slack_channel.clone());

    let sender = match channel_sender(settings) {
        Ok(sender) => sender,
        Err(e) => {
            error!(error = %e, "Cannot start notifier, nothing was sent");
            return Ok(if strict {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    let dispatcher =
        NotificationDispatcher::new(sender).with_send_timeout(settings.limits.send_timeout());

    let report = dispatcher.run(&input, &channel).await;

    if strict && report.has_failures() {
        warn!(failed = report.failed, "Notification run had failures");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
