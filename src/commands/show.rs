use owo_colors::OwoColorize;
use serde_json::json;

use super::format_status;
use crate::client::CivicClient;
use crate::error::Result;

/// Load and display a complaint with its comment thread.
pub async fn cmd_show(client: &CivicClient, id: &str, output_json: bool) -> Result<()> {
    client.open_complaint(id).await?;

    let complaint = client
        .current()
        .expect("open_complaint succeeded, detail must be set");
    let comments = client.current_comments();

    if output_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "complaint": complaint,
                "comments": comments,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} {} {}",
        complaint.complaint_number.bold(),
        format_status(complaint.status),
        complaint.title
    );
    println!("priority: {}   upvotes: {}", complaint.priority, complaint.upvote_count);
    println!("address:  {}", complaint.address);
    if let Some(assignee) = &complaint.assigned_to {
        println!("assigned: {assignee}");
    }
    if let Some(deadline) = complaint.sla_deadline {
        println!("sla due:  {deadline}");
    }
    println!();
    println!("{}", complaint.description);

    if let Some(date) = complaint.resolution_date {
        println!();
        println!("resolved {date}");
        if let Some(notes) = &complaint.resolution_notes {
            println!("  {notes}");
        }
    }

    if !comments.is_empty() {
        println!();
        println!("comments ({}):", comments.len());
        for comment in &comments {
            let author = if comment.is_official {
                format!("{} (official)", comment.author_id).cyan().to_string()
            } else {
                comment.author_id.clone()
            };
            println!("  {} {}: {}", comment.created_at, author, comment.content);
        }
    }

    Ok(())
}
