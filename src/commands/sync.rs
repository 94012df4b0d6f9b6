use owo_colors::OwoColorize;
use serde_json::json;

use crate::client::CivicClient;
use crate::error::Result;

/// Replay the pending queue against the backend and report per-entry
/// outcomes.
pub async fn cmd_sync(client: &CivicClient, output_json: bool) -> Result<()> {
    let report = client.sync_pending().await?;

    if output_json {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|f| {
                json!({
                    "local_id": f.local_id,
                    "error": f.error,
                    "transient": f.transient,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "submitted": report.submitted,
                "failed": failed,
                "halted_unauthorized": report.halted_unauthorized,
                "remaining": client.pending_len(),
            }))?
        );
        return Ok(());
    }

    if report.submitted.is_empty() && report.failed.is_empty() {
        println!("nothing to sync");
        return Ok(());
    }

    for id in &report.submitted {
        println!("{} submitted {}", "ok:".green(), id);
    }
    for failure in &report.failed {
        let hint = if failure.transient {
            "will retry on next sync"
        } else {
            "needs attention"
        };
        println!(
            "{} {} failed ({}): {}",
            "err:".red(),
            failure.local_id,
            hint,
            failure.error
        );
    }
    if report.halted_unauthorized {
        println!(
            "{} session rejected; sign in again and re-run sync",
            "warning:".yellow()
        );
    }
    println!("{} submissions still pending", client.pending_len());

    Ok(())
}
