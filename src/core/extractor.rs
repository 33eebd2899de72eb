//! Extraction service: document text in, action items out.
//!
//! Composes prompt construction, one model call and normalization. Every
//! failure is contained here: `extract` and `extract_file` always return a
//! list, while the `*_outcome` variants keep "nothing found" and "extraction
//! failed" distinguishable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::fs;
use tokio::time::timeout;
use tracing::{error, info};

use super::limits::{LimitViolation, Limits};
use super::normalize::{parse_response, ParseError};
use super::prompt::PromptBuilder;
use crate::adapters::CompletionBackend;
use crate::domain::{ActionItem, ActionRecord};

/// Why a document produced no items
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    TooLarge(#[from] LimitViolation),

    #[error("Model invocation failed: {0}")]
    Model(String),

    #[error("Model invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of extracting one document
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The model answered and the answer parsed (possibly to zero items)
    Extracted(Vec<ActionItem>),

    /// Extraction did not complete
    Failed(ExtractError),
}

impl ExtractionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Items found, or an empty list on failure
    pub fn into_items(self) -> Vec<ActionItem> {
        match self {
            Self::Extracted(items) => items,
            Self::Failed(_) => Vec::new(),
        }
    }

    /// Records for the artifact.
    ///
    /// An unreadable document yields a single error record; other failures
    /// yield nothing.
    pub fn into_records(self) -> Vec<ActionRecord> {
        match self {
            Self::Extracted(items) => items.into_iter().map(ActionRecord::from).collect(),
            Self::Failed(ExtractError::Read { source, .. }) => {
                vec![ActionRecord::error(source.to_string())]
            }
            Self::Failed(_) => Vec::new(),
        }
    }
}

/// Extracts action items from documents with a completion backend
pub struct ActionExtractor {
    backend: Box<dyn CompletionBackend>,
    prompt: PromptBuilder,
    limits: Limits,
}

impl ActionExtractor {
    pub fn new(backend: Box<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            prompt: PromptBuilder::default(),
            limits: Limits::default(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Extract items from document text; failures yield an empty list
    pub async fn extract(&self, content: &str) -> Vec<ActionItem> {
        self.extract_outcome(content).await.into_items()
    }

    /// Extract items from a file; an unreadable file yields one error record
    pub async fn extract_file(&self, path: &Path) -> Vec<ActionRecord> {
        self.extract_file_outcome(path).await.into_records()
    }

    pub async fn extract_outcome(&self, content: &str) -> ExtractionOutcome {
        match self.try_extract(content).await {
            Ok(items) => {
                info!(count = items.len(), "Extracted {} actions", items.len());
                ExtractionOutcome::Extracted(items)
            }
            Err(e) => {
                error!(error = %e, backend = self.backend.name(), "Error processing content");
                ExtractionOutcome::Failed(e)
            }
        }
    }

    pub async fn extract_file_outcome(&self, path: &Path) -> ExtractionOutcome {
        info!(path = %path.display(), "Processing {}", path.display());

        match fs::read_to_string(path).await {
            Ok(content) => self.extract_outcome(&content).await,
            Err(source) => {
                let e = ExtractError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                error!(error = %e, "Error processing {}", path.display());
                ExtractionOutcome::Failed(e)
            }
        }
    }

    async fn try_extract(&self, content: &str) -> Result<Vec<ActionItem>, ExtractError> {
        self.limits.check_document(content)?;

        let prompt = self.prompt.build(content);
        let model_timeout = self.limits.model_timeout();

        let response = timeout(model_timeout, self.backend.complete(&prompt, model_timeout))
            .await
            .map_err(|_| ExtractError::Timeout(model_timeout))?
            .map_err(|e| ExtractError::Model(format!("{:#}", e)))?;

        Ok(parse_response(&response)?)
    }
}
