//! Diffing two stored reports

use std::collections::{HashMap, HashSet};

use super::ReportStorage;
use crate::models::analytics::ComparisonResult;
use crate::models::result::{VerificationResult, VerificationStatus};
use crate::models::stored::StoredReport;

/// Days of history attached to a comparison
pub const COMPARISON_TREND_DAYS: u32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDiff {
    pub improvements: Vec<String>,
    pub regressions: Vec<String>,
    pub new_issues: Vec<String>,
    pub resolved_issues: Vec<String>,
}

impl ReportStorage {
    /// Compare `current_id` against `previous_id`; `None` if either is missing
    pub fn compare_reports(&self, current_id: &str, previous_id: &str) -> Option<ComparisonResult> {
        let current = self.get_report(current_id)?;
        let previous = self.get_report(previous_id)?;
        let diff = diff_reports(&current, &previous);

        Some(ComparisonResult {
            improvements: diff.improvements,
            regressions: diff.regressions,
            new_issues: diff.new_issues,
            resolved_issues: diff.resolved_issues,
            trend_analysis: self.generate_trend_analysis(COMPARISON_TREND_DAYS),
            current,
            previous,
        })
    }
}

/// Overall and per-module differences, in `current` module order then `previous` order
pub fn diff_reports(current: &StoredReport, previous: &StoredReport) -> ReportDiff {
    let mut diff = ReportDiff::default();

    let now = current.report.overall_status;
    let before = previous.report.overall_status;
    if now != before {
        if now.is_healthy() {
            diff.improvements
                .push(format!("Overall status improved from {before} to {now}"));
        } else if before.is_healthy() {
            diff.regressions
                .push(format!("Overall status degraded from {before} to {now}"));
        }
    }

    let previous_modules = modules_by_name(&previous.report.module_results);
    let current_modules = modules_by_name(&current.report.module_results);

    for (name, result) in ordered(&current.report.module_results) {
        match previous_modules.get(name) {
            Some(old) => {
                if result.status == old.status {
                    continue;
                }
                if result.status == VerificationStatus::Pass {
                    diff.improvements.push(format!(
                        "{name}: {} -> {}",
                        old.status, result.status
                    ));
                } else if old.status == VerificationStatus::Pass {
                    diff.regressions.push(format!(
                        "{name}: {} -> {}",
                        old.status, result.status
                    ));
                }
            }
            None => diff.new_issues.push(format!("New module added: {name}")),
        }
    }

    for (name, _) in ordered(&previous.report.module_results) {
        if !current_modules.contains_key(name) {
            diff.resolved_issues.push(format!("Module removed: {name}"));
        }
    }

    diff
}

/// Last result wins for duplicated module names
fn modules_by_name(results: &[VerificationResult]) -> HashMap<&str, &VerificationResult> {
    results.iter().map(|r| (r.module.as_str(), r)).collect()
}

/// First occurrence order, last result for duplicates
fn ordered(results: &[VerificationResult]) -> Vec<(&str, &VerificationResult)> {
    let latest = modules_by_name(results);
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.module.as_str()))
        .filter_map(|r| latest.get(r.module.as_str()).map(|l| (r.module.as_str(), *l)))
        .collect()
}
