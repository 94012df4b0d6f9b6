use owo_colors::OwoColorize;

use crate::client::CivicClient;
use crate::error::Result;

pub async fn cmd_upvote(client: &CivicClient, id: &str) -> Result<()> {
    client.open_complaint(id).await?;
    let now_upvoted = client.toggle_upvote(id).await?;
    if now_upvoted {
        println!("{} upvoted {}", "ok:".green(), id);
    } else {
        println!("{} removed upvote from {}", "ok:".green(), id);
    }
    Ok(())
}
