//! File locking and crash-safe writes
//!
//! Report bodies and the index are replaced with a write-to-temp, fsync,
//! rename sequence so a reader never observes a half-written file. Before an
//! existing file is replaced, its previous content is copied to a sibling
//! `.backup` path that the storage layer can restore from.
//!
//! Index updates are read-modify-write, so they run under an exclusive `fs2`
//! advisory lock on a dedicated lock file. Advisory locks are cooperative:
//! every writer must go through [`IndexLock`].

use anyhow::{Context, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

pub const BACKUP_SUFFIX: &str = ".backup";

/// Read file contents with a shared (read) lock.
pub fn locked_read(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content)
}

/// Sibling path holding the previous version of `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Replace `path` with `content` atomically, snapshotting any existing file first.
///
/// A failed snapshot is logged and does not block the write.
pub fn write_with_backup(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        if let Err(e) = fs::copy(path, &backup) {
            warn!(path = %path.display(), error = %e, "Failed to create backup");
        }
    }
    atomic_write(path, content)
}

/// Write to a temp file in the target directory, fsync, then rename over `path`.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.flush()
        .with_context(|| format!("Failed to flush temp file for: {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file for: {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Exclusive advisory lock held for the lifetime of the guard
pub struct IndexLock {
    file: File,
}

impl IndexLock {
    /// Block until the exclusive lock on `path` is held, creating the file if needed
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;
        Ok(Self { file })
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
