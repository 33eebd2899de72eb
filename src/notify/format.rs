//! Chat message rendering for action items.

use crate::domain::ActionEntry;

/// First message of every notification run
pub const HEADER: &str = "📋 *New Actions from Meeting Notes*\n";

pub const NO_DESCRIPTION: &str = "No description";
pub const UNASSIGNED: &str = "Unassigned";
pub const NO_DUE_DATE: &str = "No due date";
pub const NO_STATUS: &str = "No status";

/// Render one action as a Slack mrkdwn block
pub fn format_action(entry: &ActionEntry) -> String {
    let description = entry.action.as_deref().unwrap_or(NO_DESCRIPTION);
    let owner = entry.owner.as_deref().unwrap_or(UNASSIGNED);
    let due_date = entry.due_date.as_deref().unwrap_or(NO_DUE_DATE);
    let status = entry.status.as_deref().unwrap_or(NO_STATUS);

    format!(
        "*Action Item*\n\
         >*Description:* {}\n\
         >*Owner:* {}\n\
         >*Due Date:* {}\n\
         >*Status:* {}\n",
        description, owner, due_date, status
    )
}
