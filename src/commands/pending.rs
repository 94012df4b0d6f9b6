use crate::client::CivicClient;
use crate::error::Result;

/// List submissions waiting in the offline queue, in insertion order.
pub fn cmd_pending(client: &CivicClient, output_json: bool) -> Result<()> {
    let entries = client.pending();

    if output_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("no pending submissions");
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{}. {} (queued {})",
            index + 1,
            entry.payload.title,
            entry.enqueued_at
        );
    }
    Ok(())
}
