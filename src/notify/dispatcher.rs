//! Posts a saved actions artifact to a chat channel.
//!
//! One header message, then one message per action. Each send stands
//! alone: a failure is logged and the next message is still sent.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::format::{format_action, HEADER};
use crate::adapters::ChannelSender;
use crate::domain::EntryArtifact;

/// A single message that could not be delivered
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Error posting to channel: {0}")]
    Channel(String),

    #[error("Posting to channel timed out after {0:?}")]
    Timeout(Duration),
}

/// Summary of one notification run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Actions read from the artifact
    pub actions: usize,
    /// Messages attempted, header included
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    /// Set when the artifact could not be read
    pub artifact_error: Option<String>,
}

impl DispatchReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.artifact_error.is_some()
    }
}

/// Sends action items to a channel
pub struct NotificationDispatcher {
    sender: Box<dyn ChannelSender>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(sender: Box<dyn ChannelSender>) -> Self {
        Self {
            sender,
            send_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Post every action in `input_path` to `channel`
    pub async fn run(&self, input_path: &Path, channel: &str) -> DispatchReport {
        let mut report = DispatchReport::default();

        let artifact = match EntryArtifact::load(input_path).await {
            Ok(artifact) => artifact,
            Err(e) => {
                error!(error = %e, "Error reading actions file");
                warn!("No actions found to process");
                report.artifact_error = Some(e.to_string());
                return report;
            }
        };

        if artifact.is_empty() {
            warn!("No actions found to process");
            return report;
        }

        report.actions = artifact.len();
        info!(count = report.actions, %channel, "Found {} actions to process", report.actions);

        if let Err(e) = self.post(channel, HEADER, &mut report).await {
            error!(error = %e, "Failed to post header");
        }

        for entry in &artifact.actions {
            let description = entry.action.as_deref().unwrap_or("Unknown");
            let message = format_action(entry);

            match self.post(channel, &message, &mut report).await {
                Ok(()) => info!("Successfully posted action: {}", description),
                Err(e) => error!(error = %e, "Failed to post action: {}", description),
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            "Posted {} of {} messages",
            report.sent,
            report.attempted
        );

        report
    }

    /// Send one message, recording the result
    async fn post(
        &self,
        channel: &str,
        text: &str,
        report: &mut DispatchReport,
    ) -> Result<(), SendError> {
        report.attempted += 1;

        let result = match timeout(self.send_timeout, self.sender.send(channel, text)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SendError::Channel(format!("{:#}", e))),
            Err(_) => Err(SendError::Timeout(self.send_timeout)),
        };

        match result {
            Ok(()) => report.sent += 1,
            Err(_) => report.failed += 1,
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionItem, ActionRecord, ActionsArtifact};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records messages; fails on the listed (0-based) call indices
    #[derive(Default)]
    struct RecordingSender {
        messages: Arc<Mutex<Vec<(String, String)>>>,
        fail_on: Vec<usize>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ChannelSender for RecordingSender {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, channel: &str, text: &str) -> anyhow::Result<()> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls - 1
            };
            if self.fail_on.contains(&call) {
                anyhow::bail!("channel_not_found");
            }
            self.messages
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }
    }

    async fn write_artifact(dir: &Path, count: usize) -> std::path::PathBuf {
        let path = dir.join("actions.json");
        let records = (0..count)
            .map(|i| ActionRecord::from(ActionItem::new(format!("Task {}", i))))
            .collect();
        ActionsArtifact::new(records).save(&path).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_sends_header_plus_one_message_per_action() {
        let temp = TempDir::new().unwrap();
        let path = write_artifact(temp.path(), 3).await;

        let sender = RecordingSender::default();
        let messages = sender.messages.clone();
        let dispatcher = NotificationDispatcher::new(Box::new(sender));

        let report = dispatcher.run(&path, "#actions").await;

        assert_eq!(report.attempted, 4);
        assert_eq!(report.sent, 4);
        assert!(!report.has_failures());

        let messages = messages.lock().unwrap();
        assert_eq!(messages[0], ("#actions".to_string(), HEADER.to_string()));
        assert!(messages[1].1.contains(">*Description:* Task 0\n"));
        assert!(messages[3].1.contains(">*Description:* Task 2\n"));
    }

    #[tokio::test]
    async fn test_continues_after_failed_send() {
        let temp = TempDir::new().unwrap();
        let path = write_artifact(temp.path(), 4).await;

        let sender = RecordingSender {
            fail_on: vec![2],
            ..Default::default()
        };
        let messages = sender.messages.clone();
        let dispatcher = NotificationDispatcher::new(Box::new(sender));

        let report = dispatcher.run(&path, "#actions").await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.sent, 4);
        assert_eq!(report.failed, 1);

        let messages = messages.lock().unwrap();
        assert!(messages.iter().all(|(_, text)| !text.contains("Task 1\n")));
        assert!(messages.last().unwrap().1.contains("Task 3"));
    }

    #[tokio::test]
    async fn test_missing_artifact_sends_nothing() {
        let temp = TempDir::new().unwrap();
        let sender = RecordingSender::default();
        let messages = sender.messages.clone();
        let dispatcher = NotificationDispatcher::new(Box::new(sender));

        let report = dispatcher.run(&temp.path().join("absent.json"), "#actions").await;

        assert_eq!(report.attempted, 0);
        assert!(report.artifact_error.is_some());
        assert!(messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_or_empty_artifact_sends_nothing() {
        let temp = TempDir::new().unwrap();
        let malformed = temp.path().join("bad.json");
        std::fs::write(&malformed, "{not json").unwrap();
        let empty = write_artifact(temp.path(), 0).await;

        let sender = RecordingSender::default();
        let messages = sender.messages.clone();
        let dispatcher = NotificationDispatcher::new(Box::new(sender));

        let report = dispatcher.run(&malformed, "#actions").await;
        assert!(report.artifact_error.is_some());

        let report = dispatcher.run(&empty, "#actions").await;
        assert_eq!(report, DispatchReport::default());

        assert!(messages.lock().unwrap().is_empty());
    }

    struct SlowSender;

    #[async_trait]
    impl ChannelSender for SlowSender {
        fn name(&self) -> &str {
            "slow"
        }

        async fn send(&self, _channel: &str, _text: &str) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_timeout_counts_as_failure() {
        let temp = TempDir::new().unwrap();
        let path = write_artifact(temp.path(), 1).await;

        let dispatcher =
            NotificationDispatcher::new(Box::new(SlowSender)).with_send_timeout(Duration::from_secs(1));

        let report = dispatcher.run(&path, "#actions").await;
        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 2);
    }
}
