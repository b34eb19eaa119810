//! `verity show`: full detail of one stored report

use anyhow::{bail, Result};
use colored::Colorize;

use super::common::{
    format_timestamp, overall_label, print_json, severity_label, status_icon, status_label,
    CommandContext,
};
use crate::models::stored::StoredReport;
use crate::storage::StorageError;

/// Show report `id`, or the most recent one when no id is given
pub fn execute(ctx: &CommandContext, id: Option<String>, json: bool) -> Result<()> {
    let storage = ctx.storage();
    let stored = match id {
        Some(id) => storage
            .get_report(&id)
            .ok_or(StorageError::ReportNotFound(id))?,
        None => match storage.get_all_reports(Some(1), None, None).into_iter().next() {
            Some(latest) => latest,
            None => bail!("No stored reports"),
        },
    };

    if json {
        return print_json(&stored);
    }
    print_report(&stored);
    Ok(())
}

pub fn print_report(stored: &StoredReport) {
    let report = &stored.report;
    let summary = &report.summary;

    println!("{} {}", "Report".bold(), stored.id.bold());
    println!("  Stored:      {}", format_timestamp(stored.timestamp));
    println!("  Environment: {}", stored.metadata.environment);
    println!("  Version:     {}", stored.metadata.version);
    if let Some(branch) = &stored.metadata.branch {
        println!("  Branch:      {branch}");
    }
    if let Some(commit) = &stored.metadata.git_commit {
        println!("  Commit:      {commit}");
    }
    if !stored.metadata.tags.is_empty() {
        println!("  Tags:        {}", stored.metadata.tags.join(", "));
    }
    println!("  Status:      {}", overall_label(report.overall_status));
    println!(
        "  Tests:       {} total, {} passed, {} failed, {} warnings ({:.1}% pass)",
        summary.total_tests,
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.warnings.to_string().yellow(),
        summary.pass_rate()
    );
    println!("  Critical:    {}", summary.critical_issues);
    println!("  Duration:    {}ms", report.total_duration_ms);

    println!("\n{}", "Modules".bold());
    for result in &report.module_results {
        println!(
            "  {} {} {} ({}ms)",
            status_icon(result.status),
            result.module.bold(),
            status_label(result.status),
            result.duration_ms
        );
        for detail in &result.details {
            println!(
                "      {} {}/{}: {}",
                status_icon(detail.result),
                detail.component,
                detail.test,
                detail.message.dimmed()
            );
        }
        for error in &result.errors {
            println!("      {} {}", "error:".red().bold(), error);
        }
        for warning in &result.warnings {
            println!("      {} {}", "warning:".yellow().bold(), warning.message);
        }
    }

    if !report.recommendations.is_empty() {
        println!("\n{}", "Recommendations".bold());
        for rec in &report.recommendations {
            println!("  {} {}: {}", severity_label(rec.severity), rec.component, rec.issue);
            println!("      {}", rec.solution.dimmed());
            if let Some(doc) = &rec.documentation {
                println!("      {}", doc.underline());
            }
        }
    }
}
