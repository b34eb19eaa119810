pub mod analytics;
pub mod report;
pub mod result;
pub mod stored;

pub use analytics::{
    ComparisonResult, DashboardData, HistoricalTrend, Polarity, SystemHealth, TrendDirection,
    TrendMetric, TrendPoint,
};
pub use report::{
    OverallStatus, Recommendation, Severity, VerificationReport, VerificationSummary,
};
pub use result::{
    DetailData, DetailValue, VerificationDetail, VerificationResult, VerificationStatus,
    VerificationWarning,
};
pub use stored::{IndexEntry, ReportMetadata, StoredReport};
