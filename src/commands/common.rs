//! Shared helpers for command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::analytics::TrendDirection;
use crate::models::report::{OverallStatus, Severity};
use crate::models::result::VerificationStatus;
use crate::report::ReportGenerator;
use crate::storage::ReportStorage;

/// Configuration resolved from `--config` and the global overrides
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    pub fn load(config_path: Option<&Path>, storage_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::load(config_path)?;
        if let Some(dir) = storage_dir {
            config.storage.dir = dir;
        }
        Ok(Self { config })
    }

    pub fn storage(&self) -> ReportStorage {
        ReportStorage::from_config(&self.config.storage)
    }

    pub fn generator(&self) -> ReportGenerator {
        ReportGenerator::from_config(&self.config)
    }
}

/// Pretty-print `value` as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Compact "3m ago" style rendering of a duration in seconds
pub fn format_age(seconds: i64) -> String {
    match seconds {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}

pub fn overall_label(status: OverallStatus) -> ColoredString {
    match status {
        OverallStatus::Healthy => status.as_str().green().bold(),
        OverallStatus::IssuesFound => status.as_str().yellow().bold(),
        OverallStatus::CriticalFailures => status.as_str().red().bold(),
    }
}

pub fn status_label(status: VerificationStatus) -> ColoredString {
    match status {
        VerificationStatus::Pass => status.as_str().green(),
        VerificationStatus::Fail => status.as_str().red(),
        VerificationStatus::Warning => status.as_str().yellow(),
    }
}

pub fn status_icon(status: VerificationStatus) -> ColoredString {
    match status {
        VerificationStatus::Pass => "✓".green(),
        VerificationStatus::Fail => "✗".red(),
        VerificationStatus::Warning => "⚠".yellow(),
    }
}

pub fn severity_label(severity: Severity) -> ColoredString {
    let text = format!("[{severity}]");
    match severity {
        Severity::Critical | Severity::High => text.red().bold(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.dimmed(),
    }
}

pub fn trend_label(direction: TrendDirection) -> ColoredString {
    match direction {
        TrendDirection::Improving => "improving".green(),
        TrendDirection::Declining => "declining".red(),
        TrendDirection::Stable => "stable".dimmed(),
    }
}
