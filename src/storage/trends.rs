//! Metric trends over a window of stored reports

use chrono::{DateTime, Duration, Utc};

use super::ReportStorage;
use crate::models::analytics::{HistoricalTrend, Polarity, TrendDirection, TrendMetric, TrendPoint};
use crate::models::stored::StoredReport;

/// Changes at or below this many percent are reported as stable
pub const TREND_THRESHOLD_PERCENT: f64 = 5.0;

impl ReportStorage {
    /// Trends for every tracked metric over the last `days` days.
    ///
    /// Empty when fewer than two reports fall inside the window.
    pub fn generate_trend_analysis(&self, days: u32) -> Vec<HistoricalTrend> {
        let end = Utc::now();
        let start = window_start(end, days);
        let reports = self.get_all_reports(None, Some(start), Some(end));
        trends_for(&reports)
    }
}

/// `days` before `end`, or the earliest representable instant when that underflows
pub fn window_start(end: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    end.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Trends for `reports` in any order; empty for fewer than two reports
pub fn trends_for(reports: &[StoredReport]) -> Vec<HistoricalTrend> {
    if reports.len() < 2 {
        return Vec::new();
    }
    TrendMetric::ALL
        .iter()
        .map(|metric| calculate_trend(*metric, reports))
        .collect()
}

/// Series for one metric, oldest first, classified by its first and last values
pub fn calculate_trend(metric: TrendMetric, reports: &[StoredReport]) -> HistoricalTrend {
    let mut ordered: Vec<&StoredReport> = reports.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let values: Vec<TrendPoint> = ordered
        .iter()
        .map(|stored| TrendPoint {
            timestamp: stored.timestamp,
            value: metric.value_of(stored),
        })
        .collect();

    let change_percent = match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 => change_percent(first.value, last.value),
        _ => 0.0,
    };

    HistoricalTrend {
        metric,
        trend: classify_change(metric.polarity(), change_percent),
        values,
        change_percent,
    }
}

/// Relative change from `first` to `last`; zero when `first` is zero
fn change_percent(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        0.0
    } else {
        (last - first) / first * 100.0
    }
}

pub fn classify_change(polarity: Polarity, change_percent: f64) -> TrendDirection {
    if change_percent.abs() <= TREND_THRESHOLD_PERCENT {
        return TrendDirection::Stable;
    }
    let rising = change_percent > 0.0;
    match (polarity, rising) {
        (Polarity::HigherIsBetter, true) | (Polarity::LowerIsBetter, false) => {
            TrendDirection::Improving
        }
        _ => TrendDirection::Declining,
    }
}
