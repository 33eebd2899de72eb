//! The persisted actions artifact.
//!
//! One JSON object with a single `actions` array. Keys are sorted,
//! indentation is fixed at two spaces and everything outside printable
//! ASCII is written as `\uXXXX`, so identical input produces byte-identical
//! files.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use thiserror::Error;
use tokio::fs;

use super::action::{ActionEntry, ActionRecord};

/// Errors reading an artifact back from disk
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read actions file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse actions file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Two-space pretty printing with non-ASCII escaped as UTF-16 `\uXXXX` units
#[derive(Default)]
struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Aggregated actions for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsArtifact<T = ActionRecord> {
    #[serde(default = "Vec::new")]
    pub actions: Vec<T>,
}

impl<T> Default for ActionsArtifact<T> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<T> ActionsArtifact<T> {
    pub fn new(actions: Vec<T>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<T: Serialize> ActionsArtifact<T> {
    /// Render the artifact with sorted keys and two-space indentation
    pub fn to_json(&self) -> Result<String> {
        // serde_json::Map is ordered by key, so routing through Value sorts
        // every object regardless of how T declares its fields.
        let value = serde_json::to_value(self).context("Failed to serialize actions")?;

        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, AsciiFormatter::default());
        value
            .serialize(&mut serializer)
            .context("Failed to render actions JSON")?;

        String::from_utf8(out).context("Rendered actions JSON is not UTF-8")
    }

    /// Write the artifact, creating the parent directory if needed
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }

        let content = self.to_json()?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write actions file: {}", path.display()))?;

        Ok(())
    }
}

impl<T: DeserializeOwned> ActionsArtifact<T> {
    /// Parse an artifact; a missing `actions` key yields an empty list
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub async fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json(&content).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The notifier's view of an artifact
pub type EntryArtifact = ActionsArtifact<ActionEntry>;
