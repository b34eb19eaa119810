//! `verity compare`: diff two stored reports

use anyhow::{bail, Result};
use colored::Colorize;

use super::common::{overall_label, print_json, trend_label, CommandContext};
use crate::models::analytics::ComparisonResult;

/// Compare `current` against `previous`; both default to the two newest reports
pub fn execute(
    ctx: &CommandContext,
    current: Option<String>,
    previous: Option<String>,
    json: bool,
) -> Result<()> {
    let storage = ctx.storage();

    let (current, previous) = match (current, previous) {
        (Some(current), Some(previous)) => (current, previous),
        (current, None) => {
            let recent = storage.get_all_reports(Some(2), None, None);
            match (current, recent.as_slice()) {
                (Some(current), [newest, ..]) if current != newest.id => {
                    (current, newest.id.clone())
                }
                (Some(current), [_, older]) => (current, older.id.clone()),
                (None, [newest, older]) => (newest.id.clone(), older.id.clone()),
                _ => bail!("Need at least two stored reports to compare"),
            }
        }
        (None, Some(_)) => bail!("A current report id is required when a previous id is given"),
    };

    let Some(comparison) = storage.compare_reports(&current, &previous) else {
        bail!("Could not load both reports: {current}, {previous}");
    };

    if json {
        return print_json(&comparison);
    }
    print_comparison(&comparison);
    Ok(())
}

fn print_comparison(comparison: &ComparisonResult) {
    println!(
        "{} {} ({}) vs {} ({})",
        "Comparing".bold(),
        comparison.current.id.bold(),
        overall_label(comparison.current.report.overall_status),
        comparison.previous.id,
        overall_label(comparison.previous.report.overall_status)
    );

    let sections = [
        ("Improvements", &comparison.improvements, "+".green()),
        ("Regressions", &comparison.regressions, "-".red()),
        ("New issues", &comparison.new_issues, "!".yellow()),
        ("Resolved issues", &comparison.resolved_issues, "✓".green()),
    ];
    for (title, items, marker) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n{}", title.bold());
        for item in items {
            println!("  {marker} {item}");
        }
    }

    if comparison.improvements.is_empty()
        && comparison.regressions.is_empty()
        && comparison.new_issues.is_empty()
        && comparison.resolved_issues.is_empty()
    {
        println!("\n{}", "No differences".dimmed());
    }

    if !comparison.trend_analysis.is_empty() {
        println!("\n{}", "7-day trends".bold());
        for trend in &comparison.trend_analysis {
            println!(
                "  {:<22} {} ({:+.1}%)",
                trend.metric.label(),
                trend_label(trend.trend),
                trend.change_percent
            );
        }
    }
}
