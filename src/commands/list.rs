//! `verity list`: stored reports, newest first

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use super::common::{format_timestamp, overall_label, print_json, CommandContext};
use crate::storage::window_start;

pub fn execute(
    ctx: &CommandContext,
    limit: Option<usize>,
    since_days: Option<u32>,
    json: bool,
) -> Result<()> {
    let storage = ctx.storage();
    let start = since_days.map(|days| window_start(Utc::now(), days));
    let reports = storage.get_all_reports(limit, start, None);

    if json {
        return print_json(&reports);
    }

    if reports.is_empty() {
        println!("{}", "No stored reports".dimmed());
        return Ok(());
    }

    println!("{}", "Stored reports".bold());
    println!("{}", "─".repeat(100));
    for stored in &reports {
        let summary = &stored.report.summary;
        println!(
            "  {}  {}  {:<18} {:>5.1}% pass  {} tests  {}",
            stored.id.bold(),
            format_timestamp(stored.timestamp).dimmed(),
            overall_label(stored.report.overall_status),
            summary.pass_rate(),
            summary.total_tests,
            stored.metadata.environment.dimmed()
        );
    }
    println!("\n{} report(s) in {}", reports.len(), storage.root().display());
    Ok(())
}
