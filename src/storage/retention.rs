//! Bounded retention of stored reports

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use tracing::{error, info, warn};

use super::store::sort_newest_first;
use super::ReportStorage;
use crate::fs::{backup_path, IndexLock};
use crate::models::stored::IndexEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub deleted: Vec<String>,
    /// Reports whose files could not be removed; they stay in the index for the next pass
    pub failed: Vec<String>,
    pub retained: usize,
}

impl ReportStorage {
    /// Entries that retention would remove, oldest last. Nothing is changed on disk.
    pub fn plan_cleanup(&self) -> Vec<IndexEntry> {
        let entries = match self.read_index() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Index unreadable, cannot plan cleanup");
                return Vec::new();
            }
        };
        split_by_retention(entries, self.max_reports()).1
    }

    /// Delete everything beyond the newest `max_reports` and rewrite the index.
    ///
    /// Never fails: individual deletion failures are logged and skipped.
    pub fn cleanup_old_reports(&self) -> CleanupOutcome {
        match self.try_cleanup() {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Report cleanup failed");
                CleanupOutcome::default()
            }
        }
    }

    fn try_cleanup(&self) -> Result<CleanupOutcome> {
        let _lock = IndexLock::acquire(&self.lock_path())?;
        let entries = match self.read_index() {
            Ok(entries) => entries,
            Err(_) => self.rebuild_index_locked()?,
        };

        if entries.len() <= self.max_reports() {
            return Ok(CleanupOutcome {
                retained: entries.len(),
                ..CleanupOutcome::default()
            });
        }

        let (kept, expired) = split_by_retention(entries, self.max_reports());
        let mut outcome = CleanupOutcome {
            retained: kept.len(),
            ..CleanupOutcome::default()
        };

        // Undeletable bodies stay indexed so the next pass retries them
        let mut index = kept;
        for entry in expired {
            let path = self.report_path(&entry.id);
            match fs::remove_file(&path) {
                Ok(()) => outcome.deleted.push(entry.id),
                Err(e) if e.kind() == ErrorKind::NotFound => outcome.deleted.push(entry.id),
                Err(e) => {
                    warn!(id = %entry.id, error = %e, "Failed to delete old report");
                    outcome.failed.push(entry.id.clone());
                    index.push(entry);
                    continue;
                }
            }
            let _ = fs::remove_file(backup_path(&path));
        }

        sort_newest_first(&mut index);
        index.reverse();
        self.write_index(&index)?;

        info!(
            deleted = outcome.deleted.len(),
            retained = outcome.retained,
            "Cleaned up old reports"
        );
        Ok(outcome)
    }
}

/// Split into (newest `max`, the rest), both newest first
fn split_by_retention(
    mut entries: Vec<IndexEntry>,
    max: usize,
) -> (Vec<IndexEntry>, Vec<IndexEntry>) {
    sort_newest_first(&mut entries);
    let expired = if entries.len() > max {
        entries.split_off(max)
    } else {
        Vec::new()
    };
    (entries, expired)
}
