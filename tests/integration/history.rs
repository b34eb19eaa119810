//! Comparison, trends, export and dashboard over stored history

use std::fs;

use verity::models::{OverallStatus, TrendDirection, TrendMetric};
use verity::report::{ReportGenerator, ReportOptions};
use verity::storage::{ExportFormat, ExportOptions};

use crate::helpers::{failing, passing, store, temp_storage, warning};

#[test]
fn test_compare_detects_regression() {
    let (_temp, storage) = temp_storage(10);
    let previous = store(&storage, &[passing("database"), passing("api")]);
    let current = store(&storage, &[failing("database"), passing("api")]);

    let comparison = storage.compare_reports(&current.id, &previous.id).unwrap();

    assert!(comparison.improvements.is_empty());
    assert!(comparison
        .regressions
        .iter()
        .any(|r| r == "Overall status degraded from HEALTHY to CRITICAL_FAILURES"));
    assert!(comparison
        .regressions
        .iter()
        .any(|r| r == "database: PASS -> FAIL"));
    assert_eq!(comparison.trend_analysis.len(), TrendMetric::ALL.len());
}

#[test]
fn test_compare_reports_added_and_removed_modules() {
    let (_temp, storage) = temp_storage(10);
    let previous = store(&storage, &[passing("database"), passing("legacy")]);
    let current = store(&storage, &[passing("database"), passing("cache")]);

    let comparison = storage.compare_reports(&current.id, &previous.id).unwrap();

    assert_eq!(comparison.new_issues, vec!["New module added: cache"]);
    assert_eq!(comparison.resolved_issues, vec!["Module removed: legacy"]);
    assert!(comparison.regressions.is_empty());
}

#[test]
fn test_compare_missing_report() {
    let (_temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);
    assert!(storage
        .compare_reports(&stored.id, "report-2020-01-01T00-00-00-000Z-abcdef")
        .is_none());
}

#[test]
fn test_trend_polarity_from_stored_history() {
    let (_temp, storage) = temp_storage(10);
    store(&storage, &[failing("database"), passing("api")]);
    store(&storage, &[passing("database"), passing("api")]);

    let trends = storage.generate_trend_analysis(7);
    assert_eq!(trends.len(), TrendMetric::ALL.len());

    let pass_rate = trends
        .iter()
        .find(|t| t.metric == TrendMetric::PassRate)
        .unwrap();
    assert_eq!(pass_rate.values.len(), 2);
    assert_eq!(pass_rate.trend, TrendDirection::Improving);
    assert!((pass_rate.change_percent - 100.0).abs() < 1e-9);

    // One critical issue down to none is a 100% drop, and lower is better
    let critical = trends
        .iter()
        .find(|t| t.metric == TrendMetric::CriticalIssues)
        .unwrap();
    assert_eq!(critical.trend, TrendDirection::Improving);
}

#[test]
fn test_trends_need_two_reports() {
    let (_temp, storage) = temp_storage(10);
    store(&storage, &[warning("api")]);
    assert!(storage.generate_trend_analysis(30).is_empty());
}

#[test]
fn test_export_json_with_history() {
    let (temp, storage) = temp_storage(10);
    store(&storage, &[passing("database")]);
    let stored = store(&storage, &[warning("database")]);

    let output = temp.path().join("out/report.json");
    let options = ExportOptions {
        format: ExportFormat::Json,
        include_history: true,
        include_charts: false,
    };
    let written = storage
        .export_report(&stored.id, &options, Some(&output))
        .unwrap();
    assert_eq!(written, output);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(value["id"], stored.id.as_str());
    assert!(value["historicalTrends"].as_array().is_some_and(|t| !t.is_empty()));
}

#[test]
fn test_export_html_with_charts() {
    let (temp, storage) = temp_storage(10);
    store(&storage, &[passing("database")]);
    let stored = store(&storage, &[failing("database")]);

    let output = temp.path().join("report.html");
    let options = ExportOptions {
        format: ExportFormat::Html,
        include_history: false,
        include_charts: true,
    };
    storage
        .export_report(&stored.id, &options, Some(&output))
        .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains(&stored.id));
    assert!(html.contains("CRITICAL_FAILURES"));
    assert!(html.contains("<svg"));
}

#[test]
fn test_export_pdf_writes_html_sibling() {
    let (temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);

    let options = ExportOptions {
        format: ExportFormat::Pdf,
        ..ExportOptions::default()
    };
    let written = storage
        .export_report(&stored.id, &options, Some(&temp.path().join("report.pdf")))
        .unwrap();

    assert_eq!(written, temp.path().join("report.html"));
    assert!(written.exists());
    assert!(!temp.path().join("report.pdf").exists());
}

#[test]
fn test_export_default_path_and_unknown_report() {
    let (_temp, storage) = temp_storage(10);
    let stored = store(&storage, &[passing("database")]);

    let written = storage
        .export_report(&stored.id, &ExportOptions::default(), None)
        .unwrap();
    assert!(written.starts_with(storage.exports_dir()));
    assert_eq!(written.extension().and_then(|e| e.to_str()), Some("json"));

    let err = storage
        .export_report("report-2020-01-01T00-00-00-000Z-abcdef", &ExportOptions::default(), None)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_historical_report_compares_two_newest() {
    let (_temp, storage) = temp_storage(10);
    let generator = ReportGenerator::new(Some(storage.clone()));
    let options = ReportOptions::default();

    generator
        .generate_report(&[passing("database")], &options)
        .unwrap();
    let historical = generator
        .generate_historical_report(&[failing("database")], &options)
        .unwrap();

    let comparison = historical.comparison.expect("two reports are stored");
    assert_eq!(Some(&comparison.current), historical.stored.as_ref());
    assert_eq!(comparison.regressions.len(), 2);
    assert!(!historical.trends.is_empty());
}

#[test]
fn test_dashboard_reflects_latest_report() {
    let (_temp, storage) = temp_storage(10);
    let generator = ReportGenerator::new(Some(storage.clone()));

    let empty = generator.dashboard_data().unwrap();
    assert!(empty.latest_report.is_none());
    assert_eq!(empty.system_health.status, OverallStatus::IssuesFound);

    store(&storage, &[passing("database")]);
    let latest = store(&storage, &[failing("database")]);

    let dashboard = generator.dashboard_data().unwrap();
    assert_eq!(dashboard.latest_report.as_ref().map(|r| r.id.as_str()), Some(latest.id.as_str()));
    assert_eq!(dashboard.recent_reports.len(), 2);
    assert_eq!(dashboard.system_health.status, OverallStatus::CriticalFailures);
    assert_eq!(dashboard.system_health.critical_issues, 1);
    assert!(dashboard.system_health.seconds_since_last_check >= 0);
}

#[test]
fn test_dashboard_requires_storage() {
    let generator = ReportGenerator::new(None);
    assert!(generator.dashboard_data().is_err());
}
