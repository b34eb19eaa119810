//! Durable report storage
//!
//! Layout under the storage root:
//!
//! ```text
//! index.json          [{id, timestamp}, ...] listing of every stored report
//! index.lock          advisory lock serializing index read-modify-write
//! reports/<id>.json   one StoredReport body per report
//! exports/            derived json/html artifacts
//! ```
//!
//! The index is the canonical listing but can always be rebuilt from the
//! bodies. Read paths degrade to `None`/empty results instead of failing the
//! caller; only initialization and writes propagate errors.

pub mod compare;
pub mod export;
pub mod id;
pub mod retention;
pub mod store;
pub mod trends;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::fs::atomic_write;
use crate::validation::validate_id;

pub use compare::{diff_reports, ReportDiff};
pub use export::{ExportFormat, ExportOptions};
pub use retention::CleanupOutcome;
pub use trends::{
    calculate_trend, classify_change, trends_for, window_start, TREND_THRESHOLD_PERCENT,
};

const REPORTS_DIR: &str = "reports";
const EXPORTS_DIR: &str = "exports";
const INDEX_FILE: &str = "index.json";
const LOCK_FILE: &str = "index.lock";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Invalid report id '{id}': {reason}")]
    InvalidReportId { id: String, reason: String },

    #[error("Report storage unavailable at {}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reject ids that are unsafe to turn into file names
pub fn check_report_id(id: &str) -> Result<(), StorageError> {
    validate_id(id).map_err(|e| StorageError::InvalidReportId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// File-backed store of verification reports with bounded retention
#[derive(Debug, Clone)]
pub struct ReportStorage {
    root: PathBuf,
    max_reports: usize,
}

impl ReportStorage {
    /// `max_reports` is clamped to at least one
    pub fn new(root: impl Into<PathBuf>, max_reports: usize) -> Self {
        Self {
            root: root.into(),
            max_reports: max_reports.max(1),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.dir.clone(), config.max_reports)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_reports(&self) -> usize {
        self.max_reports
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub(crate) fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn report_path(&self, id: &str) -> PathBuf {
        self.reports_dir().join(format!("{id}.json"))
    }

    /// Create the directory structure and an empty index if missing.
    ///
    /// On failure a repair pass is attempted before the error is returned.
    pub fn initialize(&self) -> Result<()> {
        match self.ensure_layout() {
            Ok(()) => {
                info!(root = %self.root.display(), "Report storage initialized");
                Ok(())
            }
            Err(e) => {
                error!(root = %self.root.display(), error = %format!("{e:#}"), "Failed to initialize report storage");
                self.auto_repair();
                Err(e)
            }
        }
    }

    fn ensure_layout(&self) -> Result<()> {
        for dir in [self.root.clone(), self.reports_dir(), self.exports_dir()] {
            fs::create_dir_all(&dir).map_err(|source| StorageError::Unavailable {
                path: dir.clone(),
                source,
            })?;
        }

        let index = self.index_path();
        if !index.exists() {
            atomic_write(&index, "[]")
                .with_context(|| format!("Failed to create index: {}", index.display()))?;
        }
        Ok(())
    }

    /// Best-effort recreation of missing directories and index
    pub(crate) fn auto_repair(&self) {
        warn!(root = %self.root.display(), "Attempting to repair report storage");
        match self.ensure_layout() {
            Ok(()) => info!("Report storage repaired"),
            Err(e) => error!(error = %format!("{e:#}"), "Failed to repair report storage"),
        }
    }
}
