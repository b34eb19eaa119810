//! `verity dashboard`: current health at a glance

use anyhow::Result;
use colored::Colorize;

use super::common::{format_age, format_timestamp, overall_label, print_json, CommandContext};
use super::trends::print_trends;

pub fn execute(ctx: &CommandContext, json: bool) -> Result<()> {
    let dashboard = ctx.generator().dashboard_data()?;

    if json {
        return print_json(&dashboard);
    }

    let health = &dashboard.system_health;
    println!("{}", "Verification Dashboard".bold().blue());
    println!("{}", "=".repeat(50));

    println!("\n{}", "System Health".bold());
    println!("  Status:          {}", overall_label(health.status));
    match &dashboard.latest_report {
        Some(latest) => {
            println!(
                "  Last check:      {} ({})",
                format_timestamp(health.last_check),
                format_age(health.seconds_since_last_check)
            );
            println!("  Latest report:   {}", latest.id);
        }
        None => println!("  Last check:      {}", "never".dimmed()),
    }
    println!("  Critical issues: {}", health.critical_issues);

    println!("\n{}", "Recent Reports".bold());
    if dashboard.recent_reports.is_empty() {
        println!("  {}", "No stored reports".dimmed());
    }
    for stored in &dashboard.recent_reports {
        println!(
            "  {}  {:<18} {:>5.1}% pass",
            format_timestamp(stored.timestamp).dimmed(),
            overall_label(stored.report.overall_status),
            stored.report.summary.pass_rate()
        );
    }

    println!("\n{}", "7-day Trends".bold());
    if dashboard.trends.is_empty() {
        println!("  {}", "Not enough recent reports".dimmed());
    } else {
        print_trends(&dashboard.trends);
    }
    println!();
    Ok(())
}
