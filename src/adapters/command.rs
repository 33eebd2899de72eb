//! Completion backend that shells out to a local CLI.
//!
//! The prompt is piped to stdin and stdout is taken as the response, which
//! fits tools like `ollama run llama3` or `fabric -p raw_query`.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{CompletionBackend, ModelResponse};

/// Subprocess completion backend
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace-separated command line, e.g. "ollama run llama3"
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .context("LLM command is empty")?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn run(&self, prompt: &str, step_timeout: Duration) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", self.program))?;

        // Write the prompt while stdout is being drained; large prompts
        // otherwise stall once the child fills its output pipe.
        let stdin = child.stdin.take();
        let write_prompt = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                // Dropping stdin signals EOF
            }
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = timeout(step_timeout, async {
            tokio::join!(write_prompt, child.wait_with_output())
        })
        .await
        .with_context(|| format!("'{}' timed out after {:?}", self.program, step_timeout))?;
        let output = output.with_context(|| format!("Failed to wait for '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "'{}' failed with exit code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            );
        }

        written.with_context(|| format!("Failed to write prompt to '{}'", self.program))?;

        String::from_utf8(output.stdout)
            .with_context(|| format!("Output of '{}' is not valid UTF-8", self.program))
    }
}

#[async_trait]
impl CompletionBackend for CommandBackend {
    fn name(&self) -> &str {
        "command"
    }

    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<ModelResponse> {
        let content = self.run(prompt, timeout).await?;
        Ok(ModelResponse::Text(content))
    }
}
