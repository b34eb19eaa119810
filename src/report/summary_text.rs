//! Plain-text rendering of a batch of results, for logs and terminals

use crate::models::report::{percentage, OverallStatus};
use crate::models::result::{VerificationResult, VerificationStatus};
use crate::verify::compute_summary;

use super::generator::overall_status;

const RULE_WIDTH: usize = 60;

pub(crate) fn status_icon(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::Pass => "✓",
        VerificationStatus::Fail => "✗",
        VerificationStatus::Warning => "⚠",
    }
}

/// Render `results` as text.
///
/// Output depends only on the input: the timestamp shown is the latest
/// result timestamp, and the line is omitted for an empty batch.
pub fn generate_summary_text(results: &[VerificationResult]) -> String {
    let summary = compute_summary(results);
    let status: OverallStatus = overall_status(&summary, results);
    let rule = "=".repeat(RULE_WIDTH);
    let total = summary.total_tests;

    let mut lines = vec![
        rule.clone(),
        "VERIFICATION SUMMARY".to_string(),
        rule.clone(),
        String::new(),
        format!("Overall Status: {status}"),
    ];
    if let Some(latest) = results.iter().map(|r| r.timestamp).max() {
        lines.push(format!("Timestamp: {}", latest.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    lines.push(String::new());
    lines.push("Test Results:".to_string());
    lines.push(format!("  Total Tests: {total}"));
    lines.push(format!(
        "  Passed: {} ({:.0}%)",
        summary.passed,
        percentage(summary.passed, total)
    ));
    lines.push(format!(
        "  Failed: {} ({:.0}%)",
        summary.failed,
        percentage(summary.failed, total)
    ));
    lines.push(format!(
        "  Warnings: {} ({:.0}%)",
        summary.warnings,
        percentage(summary.warnings, total)
    ));
    lines.push(format!("  Critical Issues: {}", summary.critical_issues));
    lines.push(String::new());

    lines.push("Module Results:".to_string());
    for result in results {
        lines.push(format!(
            "  {} {}: {} ({}ms)",
            status_icon(result.status),
            result.module,
            result.status,
            result.duration_ms
        ));
        for error in &result.errors {
            lines.push(format!("    {} {error}", status_icon(VerificationStatus::Fail)));
        }
        for warning in &result.warnings {
            lines.push(format!(
                "    {} {}",
                status_icon(VerificationStatus::Warning),
                warning.message
            ));
        }
    }

    lines.push(String::new());
    lines.push(rule);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{VerificationDetail, VerificationWarning};

    fn batch() -> Vec<VerificationResult> {
        let mut ok = VerificationResult::from_details(
            "backend",
            vec![
                VerificationDetail::pass("api", "health", "ok"),
                VerificationDetail::pass("api", "auth", "ok"),
                VerificationDetail::warning("api", "latency", "slow"),
            ],
        );
        ok.duration_ms = 120;
        ok.warnings.push(VerificationWarning::new("cache disabled"));
        let broken = VerificationResult::execution_failure("database", "connection refused", 30);
        vec![ok, broken]
    }

    #[test]
    fn test_summary_text_contents() {
        let text = generate_summary_text(&batch());

        assert!(text.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(text.contains("Overall Status: CRITICAL_FAILURES"));
        assert!(text.contains("  Total Tests: 4"));
        assert!(text.contains("  Passed: 2 (50%)"));
        assert!(text.contains("  Failed: 1 (25%)"));
        assert!(text.contains("  Warnings: 1 (25%)"));
        assert!(text.contains("  Critical Issues: 1"));
        assert!(text.contains("  ⚠ backend: WARNING (120ms)"));
        assert!(text.contains("    ⚠ cache disabled"));
        assert!(text.contains("  ✗ database: FAIL (30ms)"));
        assert!(text.contains("    ✗ connection refused"));
    }

    #[test]
    fn test_summary_text_is_deterministic() {
        let results = batch();
        assert_eq!(generate_summary_text(&results), generate_summary_text(&results));
    }

    #[test]
    fn test_empty_batch() {
        let text = generate_summary_text(&[]);
        assert!(text.contains("Overall Status: HEALTHY"));
        assert!(text.contains("  Passed: 0 (0%)"));
        assert!(!text.contains("Timestamp:"));
    }
}
