//! Limits applied to external calls and input documents.
//!
//! Both black-box calls (the model and the chat service) get a
//! caller-visible timeout, and oversized documents are rejected before
//! they reach the model.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum document size in bytes (default: 1MB)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,

    /// Model call timeout in seconds (default: 120)
    #[serde(default = "default_model_timeout")]
    pub model_timeout_seconds: u64,

    /// Per-message send timeout in seconds (default: 30)
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
}

fn default_max_document_bytes() -> u64 {
    1_048_576
} // 1MB
fn default_model_timeout() -> u64 {
    120
}
fn default_send_timeout() -> u64 {
    30
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            model_timeout_seconds: default_model_timeout(),
            send_timeout_seconds: default_send_timeout(),
        }
    }
}

impl Limits {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_seconds)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_seconds)
    }

    /// Check a document against the size limit
    pub fn check_document(&self, content: &str) -> Result<(), LimitViolation> {
        let size = content.len() as u64;
        if size > self.max_document_bytes {
            return Err(LimitViolation::DocumentTooLarge {
                actual: size,
                limit: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

/// A limit that was exceeded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Document size {actual} bytes exceeds limit of {limit} bytes")]
    DocumentTooLarge { actual: u64, limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = Limits::default();
        assert_eq!(limits.max_document_bytes, 1_048_576);
        assert_eq!(limits.model_timeout(), Duration::from_secs(120));
        assert_eq!(limits.send_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let limits: Limits = serde_yaml::from_str("model_timeout_seconds: 5").unwrap();
        assert_eq!(limits.model_timeout_seconds, 5);
        assert_eq!(limits.send_timeout_seconds, 30);
    }

    #[test]
    fn test_document_size_check() {
        let limits = Limits {
            max_document_bytes: 10,
            ..Default::default()
        };

        assert!(limits.check_document("0123456789").is_ok());
        assert_eq!(
            limits.check_document("0123456789!"),
            Err(LimitViolation::DocumentTooLarge {
                actual: 11,
                limit: 10
            })
        );
    }
}
