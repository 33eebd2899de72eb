//! Corpus aggregation: every Markdown document under a directory into one
//! actions artifact.
//!
//! Documents are processed one at a time in discovery order and their
//! records are appended in that order, so an unchanged corpus produces a
//! byte-identical artifact.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use serde::Serialize;
use tracing::{info, warn};

use super::extractor::ActionExtractor;
use crate::domain::{ActionRecord, ActionsArtifact};

/// Ordinary and dot-prefixed Markdown files, at any depth
const DOCUMENT_PATTERNS: [&str; 2] = ["**/*.md", "**/.*.md"];

/// Summary of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub files_found: usize,
    pub files_with_actions: usize,
    pub files_empty: usize,
    /// Files whose extraction failed (subset of files with no items, plus
    /// unreadable files that contributed an error record)
    pub files_failed: usize,
    pub total_actions: usize,
    pub output_path: PathBuf,
}

impl AggregateReport {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Glob patterns for `directory`; an empty path means the working directory
fn document_patterns(directory: &Path) -> Vec<String> {
    let base = Pattern::escape(&directory.to_string_lossy());
    DOCUMENT_PATTERNS
        .iter()
        .map(|suffix| {
            if base.is_empty() {
                suffix.to_string()
            } else {
                format!("{}/{}", base.trim_end_matches('/'), suffix)
            }
        })
        .collect()
}

/// Find Markdown documents under `directory`.
///
/// Ordinary files come first, then dot-prefixed ones; each group is
/// sorted by path so discovery order does not depend on the filesystem.
pub fn discover_documents(directory: &Path) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut documents = Vec::new();
    for pattern in document_patterns(directory) {
        let paths = glob_with(&pattern, options)
            .with_context(|| format!("Invalid document pattern: {}", pattern))?;

        let mut group = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => group.push(path),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable path"),
            }
        }
        group.sort();
        documents.extend(group);
    }

    Ok(documents)
}

/// Runs extraction over a corpus and writes the merged artifact
pub struct CorpusAggregator {
    extractor: ActionExtractor,
    /// Directory created before writing, even when the artifact lives elsewhere
    ensure_dir: Option<PathBuf>,
}

impl CorpusAggregator {
    pub fn new(extractor: ActionExtractor) -> Self {
        Self {
            extractor,
            ensure_dir: None,
        }
    }

    pub fn with_ensure_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ensure_dir = Some(dir.into());
        self
    }

    pub fn extractor(&self) -> &ActionExtractor {
        &self.extractor
    }

    /// Extract every document under `directory` and write `output_path`
    pub async fn run(&self, directory: &Path, output_path: &Path) -> Result<AggregateReport> {
        let documents = discover_documents(directory)?;
        info!(
            count = documents.len(),
            directory = %directory.display(),
            "Found {} markdown files",
            documents.len()
        );

        let mut report = AggregateReport {
            files_found: documents.len(),
            output_path: output_path.to_path_buf(),
            ..Default::default()
        };
        let mut merged: Vec<ActionRecord> = Vec::new();

        for path in &documents {
            let outcome = self.extractor.extract_file_outcome(path).await;
            if outcome.is_failed() {
                report.files_failed += 1;
            }

            let records = outcome.into_records();
            if records.is_empty() {
                warn!(path = %path.display(), "No actions found in {}", path.display());
                report.files_empty += 1;
            } else {
                info!(
                    path = %path.display(),
                    count = records.len(),
                    "Extracted {} actions from {}",
                    records.len(),
                    path.display()
                );
                report.files_with_actions += 1;
                merged.extend(records);
            }
        }

        report.total_actions = merged.len();
        info!(total = report.total_actions, "Total actions extracted: {}", report.total_actions);

        if let Some(dir) = &self.ensure_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        ActionsArtifact::new(merged).save(output_path).await?;
        info!(path = %output_path.display(), "Results saved to {}", output_path.display());

        Ok(report)
    }
}
