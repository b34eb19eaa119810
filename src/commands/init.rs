//! `verity init`: create the storage layout and a starter config

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use super::common::CommandContext;
use crate::config::{CONFIG_FILE_NAME, DEFAULT_MAX_REPORTS, DEFAULT_VERIFIER_TIMEOUT_SECS};

fn starter_config(storage_dir: &Path) -> String {
    format!(
        r#"[storage]
dir = "{}"
max_reports = {DEFAULT_MAX_REPORTS}

[controller]
verifier_timeout_secs = {DEFAULT_VERIFIER_TIMEOUT_SECS}

[metadata]
environment = "development"

# Each verifier runs its commands in order; a non-zero exit fails that check.
[[verifiers]]
name = "infrastructure"
commands = ["test -f {CONFIG_FILE_NAME}"]
"#,
        storage_dir.display()
    )
}

/// Initialize storage; with `write_config`, also create `verity.toml` if absent
pub fn execute(ctx: &CommandContext, write_config: bool) -> Result<()> {
    let storage = ctx.storage();
    storage.initialize()?;

    println!(
        "{} Initialized report storage at {}",
        "✓".green().bold(),
        storage.root().display()
    );
    println!("  reports: {}", storage.reports_dir().display());
    println!("  exports: {}", storage.exports_dir().display());
    println!("  index:   {}", storage.index_path().display());

    if write_config {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            println!("  {} {} already exists, left unchanged", "⚠".yellow(), CONFIG_FILE_NAME);
        } else {
            fs::write(path, starter_config(storage.root()))
                .with_context(|| format!("Failed to write {CONFIG_FILE_NAME}"))?;
            println!("  {} Wrote {}", "✓".green(), CONFIG_FILE_NAME);
        }
    }
    Ok(())
}
