//! `verity trends`: metric trends over a window of stored reports

use anyhow::Result;
use colored::Colorize;

use super::common::{print_json, trend_label, CommandContext};
use crate::models::analytics::HistoricalTrend;

pub const DEFAULT_TREND_DAYS: u32 = 30;

pub fn execute(ctx: &CommandContext, days: u32, json: bool) -> Result<()> {
    let trends = ctx.storage().generate_trend_analysis(days);

    if json {
        return print_json(&trends);
    }

    println!("{} (last {days} days)", "Trends".bold());
    if trends.is_empty() {
        println!("  {}", "Not enough reports in this window (need at least 2)".dimmed());
        return Ok(());
    }
    print_trends(&trends);
    Ok(())
}

pub fn print_trends(trends: &[HistoricalTrend]) {
    for trend in trends {
        let first = trend.values.first().map(|p| p.value).unwrap_or_default();
        let last = trend.values.last().map(|p| p.value).unwrap_or_default();
        println!(
            "  {:<22} {:<10} {:>+7.1}%  {:.1} -> {:.1}  ({} points)",
            trend.metric.label(),
            trend_label(trend.trend),
            trend.change_percent,
            first,
            last,
            trend.values.len()
        );
    }
}
