//! Adapter interfaces for external systems.
//!
//! The language model and the chat service are black boxes behind two
//! traits: `CompletionBackend` turns a prompt into a response, and
//! `ChannelSender` posts a text message to a channel.

pub mod command;
pub mod openai;
pub mod slack;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use command::CommandBackend;
pub use openai::OpenAiBackend;
pub use slack::SlackClient;

/// Raw response from a completion backend
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// Backend already returned structured records
    Records(Vec<Map<String, Value>>),

    /// Free text to be parsed
    Text(String),
}

impl ModelResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }
}

/// A text-completion service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Complete a fully rendered prompt
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<ModelResponse>;
}

/// A chat transport
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Send one markdown-capable text message to a channel
    async fn send(&self, channel: &str, text: &str) -> Result<()>;
}
