//! Slack Web API adapter for posting action items to a channel.
//!
//! Endpoint: POST {base_url}/chat.postMessage
//! Auth: Bearer bot token

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::ChannelSender;

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Slack Web API client
pub struct SlackClient {
    /// Bot token (xoxb-...)
    token: String,
    /// API root, overridable for tests
    base_url: String,
    client: reqwest::Client,
}

/// Response envelope from the Slack Web API
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Slack HTTP client")?;

        Ok(Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Post a markdown message to a channel
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "channel": channel,
                "text": text,
                "mrkdwn": true,
            }))
            .send()
            .await
            .context("Failed to send Slack message")?;

        let result: SlackResponse = response
            .json()
            .await
            .context("Failed to parse Slack response")?;

        if !result.ok {
            anyhow::bail!(
                "Slack API error: {}",
                result.error.unwrap_or_else(|| "unknown_error".to_string())
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelSender for SlackClient {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, channel: &str, text: &str) -> Result<()> {
        self.post_message(channel, text).await
    }
}
