//! Core extraction pipeline.
//!
//! This module contains:
//! - Prompt: Prompt construction and the output format contract
//! - Normalize: Model output to canonical action items
//! - Extractor: Document to action items, with failures contained
//! - Aggregator: Corpus walk and artifact writing
//! - Limits: Timeouts and document size limits

pub mod aggregator;
pub mod extractor;
pub mod limits;
pub mod normalize;
pub mod prompt;

// Re-export commonly used types
pub use aggregator::{discover_documents, AggregateReport, CorpusAggregator};
pub use extractor::{ActionExtractor, ExtractError, ExtractionOutcome};
pub use limits::{LimitViolation, Limits};
pub use normalize::{normalize, parse_response, ParseError};
pub use prompt::{FormatContract, PromptBuilder, ResponseField};
