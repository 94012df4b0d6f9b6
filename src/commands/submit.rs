use owo_colors::OwoColorize;
use serde_json::json;

use crate::client::{CivicClient, SubmitOutcome};
use crate::error::Result;

/// Submit the saved draft. Falls back to the durable queue when the backend
/// is unreachable.
pub async fn cmd_submit(client: &CivicClient, output_json: bool) -> Result<()> {
    match client.submit_draft().await? {
        SubmitOutcome::Created(complaint) => {
            if output_json {
                println!("{}", serde_json::to_string_pretty(&complaint)?);
            } else {
                println!(
                    "{} submitted as {}",
                    "ok:".green(),
                    complaint.complaint_number.bold()
                );
            }
        }
        SubmitOutcome::Queued(entry) => {
            if output_json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "queued": true,
                        "local_id": entry.local_id,
                        "enqueued_at": entry.enqueued_at,
                    }))?
                );
            } else {
                println!(
                    "{} backend unreachable; submission queued ({} pending). Run 'civiclink sync' when back online.",
                    "queued:".yellow(),
                    client.pending_len()
                );
            }
        }
    }
    Ok(())
}
