//! `verity.toml` configuration
//!
//! Every section is optional; a missing file is the same as an empty one.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::stored::{ReportMetadata, DEFAULT_ENVIRONMENT, DEFAULT_REPORT_VERSION};
use crate::validation::validate_id;
use crate::verify::ControllerConfig;

pub const CONFIG_FILE_NAME: &str = "verity.toml";
pub const DEFAULT_STORAGE_DIR: &str = "./verification-reports";
pub const DEFAULT_MAX_REPORTS: usize = 100;
pub const DEFAULT_VERIFIER_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SLOW_MODULE_MS: u64 = 30_000;

/// Overrides `[metadata].environment` when set
pub const ENVIRONMENT_VAR: &str = "VERITY_ENV";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub controller: ControllerSection,
    pub report: ReportConfig,
    pub metadata: MetadataConfig,
    pub verifiers: Vec<VerifierConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub max_reports: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            max_reports: DEFAULT_MAX_REPORTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    /// Per-verifier deadline; 0 disables it
    pub verifier_timeout_secs: u64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            verifier_timeout_secs: DEFAULT_VERIFIER_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base URL for `{base}/{module}-troubleshooting.md` documentation links
    pub docs_base_url: Option<String>,
    /// Modules slower than this get a performance recommendation
    pub slow_module_ms: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            docs_base_url: None,
            slow_module_ms: DEFAULT_SLOW_MODULE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub version: String,
    pub environment: String,
    pub tags: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_REPORT_VERSION.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            tags: Vec::new(),
        }
    }
}

/// A command-backed verifier declared under `[[verifiers]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from `path`, or from `./verity.toml` when no path is given.
    ///
    /// A missing default file yields the defaults; an explicitly requested file
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.max_reports == 0 {
            bail!("storage.max_reports must be at least 1");
        }

        let mut seen = HashSet::new();
        for verifier in &self.verifiers {
            validate_id(&verifier.name)
                .with_context(|| format!("Invalid verifier name '{}'", verifier.name))?;
            if !seen.insert(verifier.name.as_str()) {
                bail!("Duplicate verifier name '{}'", verifier.name);
            }
        }

        Ok(())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        match self.controller.verifier_timeout_secs {
            0 => ControllerConfig {
                verifier_timeout: None,
            },
            secs => ControllerConfig::with_timeout(Duration::from_secs(secs)),
        }
    }

    /// Base metadata for stored reports; `VERITY_ENV` wins over the file
    pub fn report_metadata(&self) -> ReportMetadata {
        let environment = std::env::var(ENVIRONMENT_VAR)
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.metadata.environment.clone());

        ReportMetadata {
            version: self.metadata.version.clone(),
            environment,
            git_commit: None,
            branch: None,
            tags: self.metadata.tags.clone(),
        }
    }
}
