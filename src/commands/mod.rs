mod assign;
mod catalog;
mod comment;
mod draft;
mod ls;
mod pending;
mod show;
mod status;
mod submit;
mod sync;
mod upvote;

pub use assign::cmd_assign;
pub use catalog::cmd_catalog;
pub use comment::cmd_comment;
pub use draft::{DraftFields, cmd_draft_clear, cmd_draft_save, cmd_draft_show};
pub use ls::cmd_ls;
pub use pending::cmd_pending;
pub use show::cmd_show;
pub use status::cmd_status;
pub use submit::cmd_submit;
pub use sync::cmd_sync;
pub use upvote::cmd_upvote;

use owo_colors::OwoColorize;

use crate::types::ComplaintStatus;

/// Color a status tag the same way everywhere.
pub fn format_status(status: ComplaintStatus) -> String {
    let tag = format!("[{status}]");
    match status {
        ComplaintStatus::Submitted => tag.yellow().to_string(),
        ComplaintStatus::Acknowledged | ComplaintStatus::Reopened => tag.cyan().to_string(),
        ComplaintStatus::InProgress => tag.blue().to_string(),
        ComplaintStatus::Resolved => tag.green().to_string(),
        ComplaintStatus::Closed => tag.dimmed().to_string(),
        ComplaintStatus::Rejected => tag.red().to_string(),
    }
}
