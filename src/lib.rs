//! meeting-actions - Extract action items from meeting notes
//!
//! Sends each Markdown document in a directory to a language model,
//! normalizes the reply into action items, and writes one JSON artifact
//! for the whole corpus. A separate command posts a saved artifact to a
//! Slack channel, one message per action.
//!
//! # Modules
//!
//! - `adapters`: External services (OpenAI, local model command, Slack)
//! - `core`: Extraction pipeline (prompt, normalize, extractor, aggregator)
//! - `notify`: Message formatting and dispatch
//! - `domain`: Data structures (ActionItem, ActionsArtifact)
//! - `config`: Settings from flags, environment and config file
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Extract actions from ./meeting-notes into actions_<date>.json
//! meeting-actions extract
//!
//! # Post them to Slack
//! meeting-actions notify --input actions_20240105.json --channel '#actions'
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod notify;

// Re-export main types at crate root for convenience
pub use adapters::{ChannelSender, CompletionBackend, ModelResponse};
pub use crate::core::{ActionExtractor, AggregateReport, CorpusAggregator, ExtractionOutcome};
pub use domain::{ActionEntry, ActionItem, ActionRecord, ActionsArtifact};
pub use notify::{format_action, DispatchReport, NotificationDispatcher};
