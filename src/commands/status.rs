use owo_colors::OwoColorize;

use super::format_status;
use crate::client::CivicClient;
use crate::error::Result;
use crate::types::ComplaintStatus;

/// Request a status change on a complaint already loaded in some view.
pub async fn cmd_status(
    client: &CivicClient,
    id: &str,
    status: ComplaintStatus,
    notes: Option<String>,
    images: Vec<String>,
) -> Result<()> {
    // Hydrate the detail slot so the mutation has a local copy to act on.
    client.open_complaint(id).await?;
    client.update_status(id, status, notes, images).await?;
    println!("{} complaint {} is now {}", "ok:".green(), id, format_status(status));
    Ok(())
}
