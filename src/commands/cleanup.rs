//! `verity cleanup`: apply the retention limit

use anyhow::Result;
use colored::Colorize;

use super::common::{format_timestamp, print_json, CommandContext};

pub fn execute(ctx: &CommandContext, dry_run: bool, json: bool) -> Result<()> {
    let storage = ctx.storage();

    if dry_run {
        let planned = storage.plan_cleanup();
        if json {
            return print_json(&planned);
        }
        if planned.is_empty() {
            println!(
                "Nothing to clean up (limit {} reports)",
                storage.max_reports()
            );
            return Ok(());
        }
        println!(
            "{} report(s) would be deleted (limit {}):",
            planned.len(),
            storage.max_reports()
        );
        for entry in &planned {
            println!("  {}  {}", entry.id, format_timestamp(entry.timestamp).dimmed());
        }
        return Ok(());
    }

    let outcome = storage.cleanup_old_reports();
    if json {
        return print_json(&outcome);
    }

    println!(
        "{} Deleted {} report(s), {} retained",
        "✓".green(),
        outcome.deleted.len(),
        outcome.retained
    );
    for id in &outcome.failed {
        println!("  {} could not delete {id}", "⚠".yellow());
    }
    Ok(())
}
