//! Derived, never-persisted analytics over stored reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::report::OverallStatus;
use super::stored::StoredReport;

/// Direction of a metric over a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Declining => write!(f, "declining"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Whether larger values of a metric are good or bad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// The fixed set of metrics tracked across reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    PassRate,
    ExecutionTime,
    CriticalIssues,
    Warnings,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 4] = [
        TrendMetric::PassRate,
        TrendMetric::ExecutionTime,
        TrendMetric::CriticalIssues,
        TrendMetric::Warnings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrendMetric::PassRate => "Pass Rate",
            TrendMetric::ExecutionTime => "Execution Time (ms)",
            TrendMetric::CriticalIssues => "Critical Issues",
            TrendMetric::Warnings => "Warnings",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            TrendMetric::PassRate => Polarity::HigherIsBetter,
            TrendMetric::ExecutionTime | TrendMetric::CriticalIssues | TrendMetric::Warnings => {
                Polarity::LowerIsBetter
            }
        }
    }

    /// Extract this metric's value from a stored report
    pub fn value_of(&self, stored: &StoredReport) -> f64 {
        let report = &stored.report;
        match self {
            TrendMetric::PassRate => report.summary.pass_rate(),
            TrendMetric::ExecutionTime => report.total_duration_ms as f64,
            TrendMetric::CriticalIssues => report.summary.critical_issues as f64,
            TrendMetric::Warnings => report.summary.warnings as f64,
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Time series of one metric with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTrend {
    pub metric: TrendMetric,
    /// Oldest first
    pub values: Vec<TrendPoint>,
    pub trend: TrendDirection,
    pub change_percent: f64,
}

/// Module-level diff between two stored reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub current: StoredReport,
    pub previous: StoredReport,
    pub improvements: Vec<String>,
    pub regressions: Vec<String>,
    /// Modules present only in `current`
    pub new_issues: Vec<String>,
    /// Modules present only in `previous`
    pub resolved_issues: Vec<String>,
    pub trend_analysis: Vec<HistoricalTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: OverallStatus,
    /// Seconds since the latest stored report was taken
    pub seconds_since_last_check: i64,
    pub last_check: DateTime<Utc>,
    pub critical_issues: usize,
}

/// Snapshot used by the dashboard command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub latest_report: Option<StoredReport>,
    pub trends: Vec<HistoricalTrend>,
    pub recent_reports: Vec<StoredReport>,
    pub system_health: SystemHealth,
}
