//! Verifier backed by shell commands declared in configuration.
//!
//! Every command is one test: exit 0 passes, non-zero fails, and a command
//! killed by its timeout fails with a timeout message. A command that cannot
//! even be spawned is an execution error for the whole module.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use super::controller::duration_ms;
use super::executor::{run_command, CommandOutcome, DEFAULT_COMMAND_TIMEOUT};
use super::verifier::Verifier;
use crate::config::VerifierConfig;
use crate::models::result::{VerificationDetail, VerificationResult};

pub struct CommandVerifier {
    name: String,
    commands: Vec<String>,
    working_dir: Option<PathBuf>,
    command_timeout: Duration,
}

impl CommandVerifier {
    pub fn new(name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            commands,
            working_dir: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        let mut verifier = Self::new(config.name.clone(), config.commands.clone());
        verifier.working_dir = config.working_dir.clone();
        if let Some(secs) = config.command_timeout_secs {
            verifier.command_timeout = Duration::from_secs(secs);
        }
        verifier
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn detail_for(&self, outcome: &CommandOutcome) -> VerificationDetail {
        let detail = if outcome.success {
            VerificationDetail::pass(
                &self.name,
                &outcome.command,
                format!("Passed in {}ms", outcome.duration.as_millis()),
            )
        } else if outcome.timed_out {
            VerificationDetail::fail(
                &self.name,
                &outcome.command,
                format!(
                    "Command timed out after {}s",
                    self.command_timeout.as_secs()
                ),
            )
        } else {
            let reason = outcome
                .last_output_line()
                .map(str::to_string)
                .unwrap_or_else(|| format!("exit code {:?}", outcome.exit_code));
            VerificationDetail::fail(&self.name, &outcome.command, format!("Failed: {reason}"))
        };

        let detail = detail
            .with_data("duration_ms", duration_ms(outcome.duration))
            .with_data("timed_out", outcome.timed_out);
        match outcome.exit_code {
            Some(code) => detail.with_data("exit_code", i64::from(code)),
            None => detail,
        }
    }
}

impl Verifier for CommandVerifier {
    fn module_name(&self) -> &str {
        &self.name
    }

    fn verify(&self) -> Result<VerificationResult> {
        let mut details = Vec::with_capacity(self.commands.len());

        for command in &self.commands {
            let outcome = run_command(command, self.working_dir.as_deref(), self.command_timeout)
                .with_context(|| format!("Failed to execute check: {command}"))?;
            details.push(self.detail_for(&outcome));
        }

        Ok(VerificationResult::from_details(&self.name, details))
    }
}
