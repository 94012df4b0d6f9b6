use clap::{Parser, Subcommand};
use std::str::FromStr;

use crate::types::{
    ComplaintStatus, ComplaintView, Priority, VALID_PRIORITIES, VALID_STATUSES, VALID_VIEWS,
};

#[derive(Parser)]
#[command(name = "civiclink")]
#[command(about = "Offline-first citizen complaint tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit the saved draft (queued locally if the backend is unreachable)
    Submit {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Work with the in-progress complaint form
    #[command(subcommand)]
    Draft(DraftCommands),

    /// List complaints for a view
    Ls {
        /// View: mine, assigned, public, all (default: mine)
        #[arg(default_value = "mine", value_parser = parse_view)]
        view: ComplaintView,

        /// Page to fetch (default: 1)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Filter by status
        #[arg(short, long, value_parser = parse_status)]
        status: Option<ComplaintStatus>,

        /// Filter by category id
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by priority: low, medium, high, critical
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display a complaint with its comment thread
    Show {
        /// Complaint id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request a status change
    Status {
        /// Complaint id
        id: String,

        /// New status
        #[arg(value_parser = parse_status)]
        status: ComplaintStatus,

        /// Resolution or rejection notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Attach an image URI (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
    },

    /// Assign a complaint to an employee (acknowledges if still submitted)
    Assign {
        /// Complaint id
        id: String,

        /// Employee id
        employee_id: String,
    },

    /// Toggle your upvote on a complaint
    Upvote {
        /// Complaint id
        id: String,
    },

    /// Comment on a complaint
    Comment {
        /// Complaint id
        id: String,

        /// Comment text
        content: String,

        /// Attach an image URI (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
    },

    /// Replay queued submissions against the backend
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List submissions waiting in the offline queue
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the category catalog
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Overwrite the draft slot with the given fields
    Save {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Category id
        #[arg(short, long)]
        category: Option<String>,

        /// Sub-category id
        #[arg(long)]
        sub_category: Option<String>,

        /// Priority: low, medium, high, critical
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(short, long)]
        address: Option<String>,

        #[arg(short, long)]
        landmark: Option<String>,

        /// Attach an image URI (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Submit anonymously
        #[arg(long)]
        anonymous: bool,
    },

    /// Show the saved draft
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard the saved draft
    Clear,
}

fn parse_status(s: &str) -> Result<ComplaintStatus, String> {
    ComplaintStatus::from_str(s)
        .map_err(|_| format!("invalid status '{}'. Must be one of: {}", s, VALID_STATUSES.join(", ")))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s).map_err(|_| {
        format!(
            "invalid priority '{}'. Must be one of: {}",
            s,
            VALID_PRIORITIES.join(", ")
        )
    })
}

fn parse_view(s: &str) -> Result<ComplaintView, String> {
    ComplaintView::from_str(s)
        .map_err(|_| format!("invalid view '{}'. Must be one of: {}", s, VALID_VIEWS.join(", ")))
}
