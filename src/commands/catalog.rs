use crate::client::CivicClient;
use crate::error::Result;

/// Print the category catalog (fetched once per process).
pub async fn cmd_catalog(client: &CivicClient, output_json: bool) -> Result<()> {
    let catalog = client.catalog().await?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(catalog.categories())?);
        return Ok(());
    }

    for category in catalog.categories() {
        println!("{} ({})", category.name, category.id);
        for sub in &category.sub_categories {
            println!("  {} ({})", sub.name, sub.id);
        }
    }
    Ok(())
}
