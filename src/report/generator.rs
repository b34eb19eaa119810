//! Turning controller output into reports, and reports into history

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::recommendations::{generate_recommendations, RecommendationConfig};
use crate::config::Config;
use crate::models::analytics::{ComparisonResult, DashboardData, HistoricalTrend, SystemHealth};
use crate::models::report::{OverallStatus, VerificationReport, VerificationSummary};
use crate::models::result::{VerificationResult, VerificationStatus};
use crate::models::stored::{ReportMetadata, StoredReport};
use crate::storage::ReportStorage;
use crate::verify::compute_summary;

/// Window used by [`ReportGenerator::generate_historical_report`]
pub const HISTORY_TREND_DAYS: u32 = 30;
/// Window used by [`ReportGenerator::dashboard_data`]
pub const DASHBOARD_TREND_DAYS: u32 = 7;
pub const DASHBOARD_RECENT_REPORTS: usize = 10;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub include_recommendations: bool,
    /// Persist the report when the generator has storage
    pub auto_store: bool,
    pub metadata: ReportMetadata,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_recommendations: true,
            auto_store: true,
            metadata: ReportMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub report: VerificationReport,
    /// Set when the report was persisted
    pub stored: Option<StoredReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalReport {
    pub report: VerificationReport,
    pub stored: Option<StoredReport>,
    pub trends: Vec<HistoricalTrend>,
    /// The two most recent stored reports, newest as `current`
    pub comparison: Option<ComparisonResult>,
}

/// CRITICAL_FAILURES when a failed module carries execution errors, else
/// ISSUES_FOUND for any failed or warning detail, else HEALTHY
pub fn overall_status(summary: &VerificationSummary, results: &[VerificationResult]) -> OverallStatus {
    let critical = results
        .iter()
        .any(|r| r.status == VerificationStatus::Fail && r.has_errors());

    if critical {
        OverallStatus::CriticalFailures
    } else if summary.failed > 0 || summary.warnings > 0 {
        OverallStatus::IssuesFound
    } else {
        OverallStatus::Healthy
    }
}

pub struct ReportGenerator {
    storage: Option<ReportStorage>,
    recommendations: RecommendationConfig,
}

impl ReportGenerator {
    pub fn new(storage: Option<ReportStorage>) -> Self {
        Self {
            storage,
            recommendations: RecommendationConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Some(ReportStorage::from_config(&config.storage)))
            .with_recommendations(RecommendationConfig::from(&config.report))
    }

    pub fn with_recommendations(mut self, config: RecommendationConfig) -> Self {
        self.recommendations = config;
        self
    }

    pub fn storage(&self) -> Option<&ReportStorage> {
        self.storage.as_ref()
    }

    fn require_storage(&self) -> Result<&ReportStorage> {
        self.storage
            .as_ref()
            .context("Report storage is not configured")
    }

    pub fn initialize(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.initialize()?;
        }
        Ok(())
    }

    /// Aggregate `results` into a report. No I/O.
    pub fn build_report(
        &self,
        results: &[VerificationResult],
        include_recommendations: bool,
    ) -> VerificationReport {
        let summary = compute_summary(results);
        let recommendations = if include_recommendations {
            generate_recommendations(results, &self.recommendations)
        } else {
            Vec::new()
        };

        VerificationReport {
            overall_status: overall_status(&summary, results),
            timestamp: Utc::now(),
            total_duration_ms: results
                .iter()
                .fold(0u64, |total, r| total.saturating_add(r.duration_ms)),
            summary,
            module_results: results.to_vec(),
            recommendations,
        }
    }

    /// Build a report and, when requested and possible, store it
    pub fn generate_report(
        &self,
        results: &[VerificationResult],
        options: &ReportOptions,
    ) -> Result<GeneratedReport> {
        let report = self.build_report(results, options.include_recommendations);

        let stored = match (&self.storage, options.auto_store) {
            (Some(storage), true) => Some(
                storage
                    .store_report(&report, options.metadata.clone())
                    .context("Failed to store generated report")?,
            ),
            (None, true) => {
                debug!("No storage configured, report not persisted");
                None
            }
            (_, false) => None,
        };

        info!(status = %report.overall_status, modules = results.len(), "Generated verification report");
        Ok(GeneratedReport { report, stored })
    }

    pub fn store_report(
        &self,
        report: &VerificationReport,
        metadata: ReportMetadata,
    ) -> Result<StoredReport> {
        self.require_storage()?.store_report(report, metadata)
    }

    /// Report plus 30-day trends and a comparison of the two newest stored reports
    pub fn generate_historical_report(
        &self,
        results: &[VerificationResult],
        options: &ReportOptions,
    ) -> Result<HistoricalReport> {
        let generated = self.generate_report(results, options)?;

        let (trends, comparison) = match &self.storage {
            Some(storage) => {
                let trends = storage.generate_trend_analysis(HISTORY_TREND_DAYS);
                let recent = storage.get_all_reports(Some(2), None, None);
                let comparison = match recent.as_slice() {
                    [current, previous] => storage.compare_reports(&current.id, &previous.id),
                    _ => None,
                };
                (trends, comparison)
            }
            None => (Vec::new(), None),
        };

        Ok(HistoricalReport {
            report: generated.report,
            stored: generated.stored,
            trends,
            comparison,
        })
    }

    /// Latest report, recent history and 7-day trends
    pub fn dashboard_data(&self) -> Result<DashboardData> {
        let storage = self.require_storage()?;
        let recent = storage.get_all_reports(Some(DASHBOARD_RECENT_REPORTS), None, None);
        let trends = storage.generate_trend_analysis(DASHBOARD_TREND_DAYS);
        Ok(assemble_dashboard(recent, trends, Utc::now()))
    }
}

/// `recent` must be newest first
pub fn assemble_dashboard(
    recent: Vec<StoredReport>,
    trends: Vec<HistoricalTrend>,
    now: DateTime<Utc>,
) -> DashboardData {
    let latest = recent.first().cloned();

    let system_health = match &latest {
        Some(stored) => SystemHealth {
            status: stored.report.overall_status,
            seconds_since_last_check: (now - stored.timestamp).num_seconds().max(0),
            last_check: stored.timestamp,
            critical_issues: stored.report.summary.critical_issues,
        },
        None => SystemHealth {
            status: OverallStatus::IssuesFound,
            seconds_since_last_check: 0,
            last_check: now,
            critical_issues: 0,
        },
    };

    DashboardData {
        latest_report: latest,
        trends,
        recent_reports: recent,
        system_health,
    }
}
