//! Self-contained HTML rendering of a stored report

use std::fmt::Write;

use super::ExportOptions;
use crate::models::analytics::{HistoricalTrend, TrendDirection};
use crate::models::report::Severity;
use crate::models::result::VerificationStatus;
use crate::models::stored::StoredReport;

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; background: #f9fafb; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.header { border-bottom: 2px solid #e5e7eb; padding-bottom: 20px; margin-bottom: 20px; }
.badge { padding: 4px 12px; border-radius: 20px; color: white; font-weight: bold; }
.summary-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin: 20px 0; }
.card { background: #f3f4f6; padding: 15px; border-radius: 8px; text-align: center; }
.card .value { font-size: 2em; font-weight: bold; }
.module { margin: 15px 0; padding: 15px; border: 1px solid #e5e7eb; border-radius: 8px; }
.detail { padding: 5px 0; border-bottom: 1px solid #f3f4f6; }
.errors { color: #ef4444; margin-top: 10px; }
.recommendations { background: #fef3c7; padding: 15px; border-radius: 8px; margin: 20px 0; }
.trends td, .trends th { padding: 4px 12px; text-align: left; }
.footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 0.9em; }
"#;

const GREEN: &str = "#22c55e";
const RED: &str = "#ef4444";
const AMBER: &str = "#f59e0b";
const GREY: &str = "#6b7280";

fn status_color(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::Pass => GREEN,
        VerificationStatus::Fail => RED,
        VerificationStatus::Warning => AMBER,
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => RED,
        Severity::Medium => AMBER,
        Severity::Low => GREY,
    }
}

fn trend_color(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Improving => GREEN,
        TrendDirection::Declining => RED,
        TrendDirection::Stable => GREY,
    }
}

/// Escape text for use in element content and quoted attributes
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `stored` as a complete HTML document with inline styles only
pub fn render_html(stored: &StoredReport, options: &ExportOptions, trends: &[HistoricalTrend]) -> String {
    let report = &stored.report;
    let overall_color = if report.overall_status.is_healthy() {
        GREEN
    } else if report.summary.critical_issues > 0 {
        RED
    } else {
        AMBER
    };

    // Writing to a String cannot fail
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Verification Report - {id}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<div class=\"header\">\n<h1>Verification Report</h1>\n\
         <p><strong>Report ID:</strong> {id}</p>\n\
         <p><strong>Generated:</strong> {generated}</p>\n\
         <p><strong>Environment:</strong> {environment}</p>\n\
         <p><strong>Version:</strong> {version}</p>\n",
        id = escape_html(&stored.id),
        generated = stored.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        environment = escape_html(&stored.metadata.environment),
        version = escape_html(&stored.metadata.version),
    );
    if let Some(branch) = &stored.metadata.branch {
        let _ = writeln!(html, "<p><strong>Branch:</strong> {}</p>", escape_html(branch));
    }
    if let Some(commit) = &stored.metadata.git_commit {
        let _ = writeln!(html, "<p><strong>Commit:</strong> {}</p>", escape_html(commit));
    }
    let _ = writeln!(
        html,
        "<span class=\"badge\" style=\"background-color: {overall_color}\">{}</span>\n</div>",
        report.overall_status
    );

    let summary = &report.summary;
    let _ = writeln!(html, "<div class=\"summary-grid\">");
    for (label, value, color) in [
        ("Total Tests", summary.total_tests.to_string(), "inherit"),
        ("Passed", summary.passed.to_string(), GREEN),
        ("Failed", summary.failed.to_string(), RED),
        ("Warnings", summary.warnings.to_string(), AMBER),
        ("Pass Rate", format!("{:.1}%", summary.pass_rate()), "inherit"),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"card\"><h3>{label}</h3><div class=\"value\" style=\"color: {color}\">{value}</div></div>"
        );
    }
    let _ = writeln!(html, "</div>");

    let _ = writeln!(html, "<h2>Module Results</h2>");
    for result in &report.module_results {
        let _ = writeln!(
            html,
            "<div class=\"module\">\n<h3>{} <span class=\"badge\" style=\"background-color: {}; font-size: 0.8em\">{}</span></h3>\n\
             <p><strong>Duration:</strong> {}ms</p>",
            escape_html(&result.module),
            status_color(result.status),
            result.status,
            result.duration_ms
        );

        if !result.details.is_empty() {
            let _ = writeln!(html, "<h4>Test Details</h4>");
            for detail in &result.details {
                let _ = writeln!(
                    html,
                    "<div class=\"detail\"><span style=\"color: {}\">&#9679;</span> <strong>{}:</strong> {} - {}</div>",
                    status_color(detail.result),
                    escape_html(&detail.component),
                    escape_html(&detail.test),
                    escape_html(&detail.message)
                );
            }
        }

        if !result.warnings.is_empty() {
            let _ = writeln!(html, "<h4>Warnings</h4>");
            for warning in &result.warnings {
                let _ = writeln!(
                    html,
                    "<div class=\"detail\" style=\"color: {AMBER}\">&#8226; {}</div>",
                    escape_html(&warning.message)
                );
            }
        }

        if !result.errors.is_empty() {
            let _ = writeln!(html, "<div class=\"errors\">\n<h4>Errors</h4>");
            for error in &result.errors {
                let _ = writeln!(html, "<div>&#8226; {}</div>", escape_html(error));
            }
            let _ = writeln!(html, "</div>");
        }
        let _ = writeln!(html, "</div>");
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(html, "<div class=\"recommendations\">\n<h2>Recommendations</h2>");
        for rec in &report.recommendations {
            let _ = write!(
                html,
                "<div style=\"margin: 10px 0\"><strong style=\"color: {}\">[{}]</strong> <strong>{}:</strong> {}<br><em>Solution:</em> {}",
                severity_color(rec.severity),
                rec.severity,
                escape_html(&rec.component),
                escape_html(&rec.issue),
                escape_html(&rec.solution)
            );
            if let Some(doc) = &rec.documentation {
                let doc = escape_html(doc);
                let _ = write!(html, "<br><a href=\"{doc}\">{doc}</a>");
            }
            let _ = writeln!(html, "</div>");
        }
        let _ = writeln!(html, "</div>");
    }

    if !trends.is_empty() && (options.include_history || options.include_charts) {
        render_trends(&mut html, trends, options.include_charts);
    }

    let _ = write!(
        html,
        "<div class=\"footer\">\n<p>Total execution time: {}ms</p>\n</div>\n</div>\n</body>\n</html>\n",
        report.total_duration_ms
    );
    html
}

fn render_trends(html: &mut String, trends: &[HistoricalTrend], charts: bool) {
    let _ = writeln!(
        html,
        "<h2>Trends</h2>\n<table class=\"trends\">\n<tr><th>Metric</th><th>Trend</th><th>Change</th>{}</tr>",
        if charts { "<th>History</th>" } else { "" }
    );
    for trend in trends {
        let _ = write!(
            html,
            "<tr><td>{}</td><td style=\"color: {}\">{}</td><td>{:+.1}%</td>",
            trend.metric,
            trend_color(trend.trend),
            trend.trend,
            trend.change_percent
        );
        if charts {
            let _ = write!(html, "<td>{}</td>", sparkline(trend));
        }
        let _ = writeln!(html, "</tr>");
    }
    let _ = writeln!(html, "</table>");
}

const SPARK_WIDTH: f64 = 160.0;
const SPARK_HEIGHT: f64 = 32.0;

/// Inline SVG polyline of the trend values
fn sparkline(trend: &HistoricalTrend) -> String {
    let values: Vec<f64> = trend.values.iter().map(|p| p.value).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };
    let step = if values.len() > 1 {
        SPARK_WIDTH / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * step;
            let y = SPARK_HEIGHT - ((v - min) / span) * SPARK_HEIGHT;
            format!("{x:.1},{y:.1}")
        })
        .collect();

    format!(
        "<svg width=\"{SPARK_WIDTH}\" height=\"{SPARK_HEIGHT}\" viewBox=\"0 0 {SPARK_WIDTH} {SPARK_HEIGHT}\">\
         <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/></svg>",
        trend_color(trend.trend),
        points.join(" ")
    )
}
