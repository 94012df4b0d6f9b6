use owo_colors::OwoColorize;

use crate::client::CivicClient;
use crate::complaint::GeoPoint;
use crate::error::Result;
use crate::offline::Draft;
use crate::types::Priority;

#[derive(Debug, Default)]
pub struct DraftFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<Priority>,
    pub address: Option<String>,
    pub landmark: Option<String>,
    pub location: Option<GeoPoint>,
    pub images: Vec<String>,
    pub anonymous: bool,
}

/// Overwrite the draft slot. The form is a single slot by design: saving
/// replaces whatever was there.
pub fn cmd_draft_save(client: &CivicClient, fields: DraftFields) -> Result<()> {
    let draft = Draft {
        title: fields.title,
        description: fields.description,
        category_id: fields.category,
        sub_category_id: fields.sub_category,
        priority: fields.priority,
        address: fields.address,
        landmark: fields.landmark,
        location: fields.location,
        images: fields.images,
        is_anonymous: fields.anonymous,
        saved_at: None,
    };
    client.save_draft(draft)?;
    println!("{} draft saved", "ok:".green());
    Ok(())
}

pub fn cmd_draft_show(client: &CivicClient, output_json: bool) -> Result<()> {
    match client.draft() {
        Some(draft) => {
            if output_json {
                println!("{}", serde_json::to_string_pretty(&draft)?);
            } else {
                println!("title:       {}", draft.title.as_deref().unwrap_or("(unset)"));
                println!(
                    "description: {}",
                    draft.description.as_deref().unwrap_or("(unset)")
                );
                println!(
                    "category:    {}{}",
                    draft.category_id.as_deref().unwrap_or("(unset)"),
                    draft
                        .sub_category_id
                        .as_deref()
                        .map(|s| format!(" / {s}"))
                        .unwrap_or_default()
                );
                println!(
                    "priority:    {}",
                    draft.priority.unwrap_or_default()
                );
                println!("address:     {}", draft.address.as_deref().unwrap_or("(unset)"));
                if let Some(saved_at) = draft.saved_at {
                    println!("saved:       {saved_at}");
                }
            }
        }
        None => println!("no draft saved"),
    }
    Ok(())
}

pub fn cmd_draft_clear(client: &CivicClient) -> Result<()> {
    client.clear_draft()?;
    println!("{} draft cleared", "ok:".green());
    Ok(())
}
