use owo_colors::OwoColorize;

use crate::client::CivicClient;
use crate::error::Result;

/// Assign a complaint to an employee. An unassigned complaint is
/// acknowledged in the same step.
pub async fn cmd_assign(client: &CivicClient, id: &str, employee_id: &str) -> Result<()> {
    client.open_complaint(id).await?;
    client.assign(id, employee_id).await?;
    println!("{} complaint {} assigned to {}", "ok:".green(), id, employee_id);
    Ok(())
}
