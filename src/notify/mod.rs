//! Chat notifications for extracted action items.
//!
//! - Format: renders one action as a message block
//! - Dispatcher: reads an artifact and posts it to a channel

pub mod dispatcher;
pub mod format;

pub use dispatcher::{DispatchReport, NotificationDispatcher, SendError};
pub use format::{format_action, HEADER};
