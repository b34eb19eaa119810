//! Aggregated report types produced once per verification run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::result::VerificationResult;

/// Health classification of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Healthy,
    IssuesFound,
    CriticalFailures,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Healthy => "HEALTHY",
            OverallStatus::IssuesFound => "ISSUES_FOUND",
            OverallStatus::CriticalFailures => "CRITICAL_FAILURES",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, OverallStatus::Healthy)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts derived from the details of every result in a run.
///
/// Only ever produced by [`crate::verify::compute_summary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub critical_issues: usize,
}

impl VerificationSummary {
    /// Pass rate as a percentage; zero when there were no tests
    pub fn pass_rate(&self) -> f64 {
        percentage(self.passed, self.total_tests)
    }
}

/// `value` as a percentage of `total`, zero when `total` is zero
pub fn percentage(value: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (value as f64 / total as f64) * 100.0
    }
}

/// Actionable follow-up derived from a failing or warning observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub component: String,
    pub issue: String,
    pub solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Outcome of one full verification cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub overall_status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    /// Sum of per-module durations; a workload figure, not wall time
    pub total_duration_ms: u64,
    pub summary: VerificationSummary,
    pub module_results: Vec<VerificationResult>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}
