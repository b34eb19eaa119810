//! Report bodies and the shared index

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::{check_report_id, id, ReportStorage};
use crate::fs::{atomic_write, backup_path, locked_read, write_with_backup, IndexLock};
use crate::models::report::VerificationReport;
use crate::models::stored::{IndexEntry, ReportMetadata, StoredReport};

const CORRUPT_SUFFIX: &str = ".corrupt";

/// Newest first; ids break timestamp ties since they embed the same instant
pub(crate) fn sort_newest_first(entries: &mut [IndexEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

impl ReportStorage {
    /// Persist `report` under a fresh id, then apply retention.
    ///
    /// A failed write triggers a repair pass before the error is returned.
    pub fn store_report(
        &self,
        report: &VerificationReport,
        metadata: ReportMetadata,
    ) -> Result<StoredReport> {
        match self.write_report(report, metadata) {
            Ok(stored) => {
                info!(id = %stored.id, status = %stored.report.overall_status, "Stored verification report");
                let outcome = self.cleanup_old_reports();
                if !outcome.deleted.is_empty() {
                    debug!(deleted = outcome.deleted.len(), "Retention removed old reports");
                }
                Ok(stored)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to store verification report");
                self.auto_repair();
                Err(e)
            }
        }
    }

    fn write_report(
        &self,
        report: &VerificationReport,
        metadata: ReportMetadata,
    ) -> Result<StoredReport> {
        let reports_dir = self.reports_dir();
        fs::create_dir_all(&reports_dir).with_context(|| {
            format!("Failed to create reports directory: {}", reports_dir.display())
        })?;

        let (id, timestamp) = id::generate_report_id();
        let stored = StoredReport {
            id,
            timestamp,
            report: report.clone(),
            metadata,
        };

        let body = serde_json::to_string_pretty(&stored).context("Failed to serialize report")?;
        write_with_backup(&self.report_path(&stored.id), &body)?;

        let _lock = IndexLock::acquire(&self.lock_path())?;
        let mut entries = match self.read_index() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Index unreadable, rebuilding from report files");
                self.rebuild_index_locked()?
            }
        };
        if !entries.iter().any(|e| e.id == stored.id) {
            entries.push(stored.index_entry());
        }
        self.write_index(&entries)?;

        Ok(stored)
    }

    /// Load one report.
    ///
    /// Unknown or invalid ids yield `None`. An unreadable body is restored from
    /// its backup when possible; otherwise it is quarantined and dropped from
    /// the index.
    pub fn get_report(&self, id: &str) -> Option<StoredReport> {
        if let Err(e) = check_report_id(id) {
            warn!(error = %e, "Rejected report id");
            return None;
        }

        let path = self.report_path(id);
        if !path.exists() {
            self.prune_index_entry(id);
            return None;
        }

        match read_stored_report(&path) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(id, error = %format!("{e:#}"), "Report file is unreadable");
                self.recover_report(id, &path)
            }
        }
    }

    fn recover_report(&self, id: &str, path: &Path) -> Option<StoredReport> {
        let backup = backup_path(path);
        if backup.exists() {
            match read_stored_report(&backup) {
                Ok(stored) if stored.id == id => {
                    let restored = fs::read_to_string(&backup)
                        .map_err(anyhow::Error::from)
                        .and_then(|content| atomic_write(path, &content));
                    match restored {
                        Ok(()) => info!(id, "Restored report from backup"),
                        Err(e) => warn!(id, error = %format!("{e:#}"), "Failed to write restored report"),
                    }
                    return Some(stored);
                }
                Ok(_) => warn!(id, "Backup belongs to a different report"),
                Err(e) => warn!(id, error = %format!("{e:#}"), "Backup is unreadable"),
            }
        }

        let mut quarantine = path.as_os_str().to_owned();
        quarantine.push(CORRUPT_SUFFIX);
        match fs::rename(path, &quarantine) {
            Ok(()) => warn!(id, "Quarantined corrupt report"),
            Err(e) => error!(id, error = %e, "Failed to quarantine corrupt report"),
        }
        self.prune_index_entry(id);
        None
    }

    /// Reports from the index, newest first.
    ///
    /// Both date bounds are inclusive. A missing or unparseable index is
    /// rebuilt from the report files; any other failure yields an empty list.
    pub fn get_all_reports(
        &self,
        limit: Option<usize>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<StoredReport> {
        let mut entries = match self.read_index() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Index unreadable, rebuilding from report files");
                match self.rebuild_index() {
                    Ok(entries) => entries,
                    Err(e) => {
                        error!(error = %format!("{e:#}"), "Failed to rebuild index");
                        return Vec::new();
                    }
                }
            }
        };

        entries.retain(|e| {
            start.is_none_or(|s| e.timestamp >= s) && end.is_none_or(|t| e.timestamp <= t)
        });
        sort_newest_first(&mut entries);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        entries
            .iter()
            .filter_map(|entry| self.get_report(&entry.id))
            .collect()
    }

    /// Index entries in file order
    pub fn read_index(&self) -> Result<Vec<IndexEntry>> {
        let path = self.index_path();
        if !path.exists() {
            bail!("Index file not found: {}", path.display());
        }
        let content = locked_read(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse index: {}", path.display()))
    }

    /// Caller must hold the index lock
    pub(crate) fn write_index(&self, entries: &[IndexEntry]) -> Result<()> {
        let content = serde_json::to_string_pretty(entries).context("Failed to serialize index")?;
        write_with_backup(&self.index_path(), &content)
    }

    /// Regenerate the index from the report files on disk
    pub fn rebuild_index(&self) -> Result<Vec<IndexEntry>> {
        fs::create_dir_all(self.root())
            .with_context(|| format!("Failed to create directory: {}", self.root().display()))?;
        let _lock = IndexLock::acquire(&self.lock_path())?;
        self.rebuild_index_locked()
    }

    pub(crate) fn rebuild_index_locked(&self) -> Result<Vec<IndexEntry>> {
        let reports_dir = self.reports_dir();
        let mut entries = Vec::new();

        if reports_dir.exists() {
            let dir = fs::read_dir(&reports_dir).with_context(|| {
                format!("Failed to read reports directory: {}", reports_dir.display())
            })?;

            let mut seen = HashSet::new();
            for entry in dir.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                match read_stored_report(&path) {
                    Ok(stored) if stored.id == stem => {
                        if seen.insert(stored.id.clone()) {
                            entries.push(stored.index_entry());
                        }
                    }
                    Ok(stored) => {
                        warn!(file = %path.display(), id = %stored.id, "Report id does not match file name, skipping");
                    }
                    Err(e) => {
                        warn!(file = %path.display(), error = %format!("{e:#}"), "Skipping unreadable report");
                    }
                }
            }
        }

        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        self.write_index(&entries)?;
        info!(reports = entries.len(), "Rebuilt report index");
        Ok(entries)
    }

    /// Drop `id` from the index if listed. Failures are logged only.
    fn prune_index_entry(&self, id: &str) {
        let result = IndexLock::acquire(&self.lock_path()).and_then(|_lock| {
            let mut entries = self.read_index()?;
            let before = entries.len();
            entries.retain(|e| e.id != id);
            if entries.len() != before {
                self.write_index(&entries)?;
                debug!(id, "Removed stale index entry");
            }
            Ok(())
        });
        if let Err(e) = result {
            debug!(id, error = %format!("{e:#}"), "Could not prune index entry");
        }
    }
}

fn read_stored_report(path: &Path) -> Result<StoredReport> {
    let content = locked_read(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse report: {}", path.display()))
}
