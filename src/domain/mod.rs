//! Domain types for meeting-actions.
//!
//! - ActionItem: a task extracted from meeting notes
//! - ActionRecord: an item or an error sentinel for an unreadable document
//! - ActionsArtifact: the persisted aggregate of a run

pub mod action;
pub mod artifact;

// Re-export commonly used types
pub use action::{ActionEntry, ActionItem, ActionRecord};
pub use artifact::{ActionsArtifact, ArtifactError, EntryArtifact};
