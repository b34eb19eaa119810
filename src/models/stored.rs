//! Persisted report envelope and index projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::report::VerificationReport;

pub const DEFAULT_REPORT_VERSION: &str = "1.0.0";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Caller-supplied context attached to a report when it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub version: String,
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            version: DEFAULT_REPORT_VERSION.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            git_commit: None,
            branch: None,
            tags: Vec::new(),
        }
    }
}

/// A report as persisted by [`crate::storage::ReportStorage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub report: VerificationReport,
    pub metadata: ReportMetadata,
}

impl StoredReport {
    pub fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Lightweight listing entry kept in the shared index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}
