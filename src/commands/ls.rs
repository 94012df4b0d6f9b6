use tabled::{Table, Tabled, settings::Style};

use crate::client::CivicClient;
use crate::complaint::Complaint;
use crate::error::Result;
use crate::types::{ComplaintFilter, ComplaintStatus, ComplaintView, Priority};

#[derive(Tabled)]
struct ComplaintRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PRIORITY")]
    priority: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "UPVOTES")]
    upvotes: u32,
}

impl From<&Complaint> for ComplaintRow {
    fn from(c: &Complaint) -> Self {
        ComplaintRow {
            number: c.complaint_number.clone(),
            status: c.status.to_string(),
            priority: c.priority.to_string(),
            title: c.title.clone(),
            upvotes: c.upvote_count,
        }
    }
}

/// Fetch and print one page of a view.
pub async fn cmd_ls(
    client: &CivicClient,
    view: ComplaintView,
    page: u32,
    status: Option<ComplaintStatus>,
    category: Option<String>,
    priority: Option<Priority>,
    output_json: bool,
) -> Result<()> {
    let filter = ComplaintFilter {
        status,
        category_id: category,
        priority,
        ..Default::default()
    };

    // A changed filter restarts the view at page 1.
    let current = client.view(view);
    if filter != current.filter {
        client.set_filter(view, filter).await?;
    } else {
        client.fetch_page_with_filter(view, page, filter).await?;
    }

    let snapshot = client.view(view);
    if output_json {
        println!("{}", serde_json::to_string_pretty(&snapshot.complaints)?);
        return Ok(());
    }

    if snapshot.complaints.is_empty() {
        println!("no complaints in '{view}' (page {})", snapshot.meta.page);
        return Ok(());
    }

    let rows: Vec<ComplaintRow> = snapshot.complaints.iter().map(Into::into).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
    println!(
        "page {}/{} ({} total)",
        snapshot.meta.page, snapshot.meta.total_pages, snapshot.meta.total
    );

    Ok(())
}
