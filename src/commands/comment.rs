use owo_colors::OwoColorize;

use crate::client::CivicClient;
use crate::error::Result;

pub async fn cmd_comment(
    client: &CivicClient,
    id: &str,
    content: String,
    images: Vec<String>,
) -> Result<()> {
    client.open_complaint(id).await?;
    let comment = client.add_comment(id, content, images).await?;
    let tag = if comment.is_official { " (official)" } else { "" };
    println!("{} comment added to {}{}", "ok:".green(), id, tag);
    Ok(())
}
