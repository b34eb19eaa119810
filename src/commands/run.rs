//! `verity run`: execute configured verifiers and record the report

use anyhow::{bail, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use super::common::{overall_label, print_json, severity_label, CommandContext};
use crate::config::Config;
use crate::models::report::OverallStatus;
use crate::report::{generate_summary_text, ReportOptions};
use crate::verify::{CommandVerifier, Controller};

#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Run only this verifier
    pub module: Option<String>,
    pub no_store: bool,
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub tags: Vec<String>,
    pub json: bool,
    /// Exit non-zero for ISSUES_FOUND as well as CRITICAL_FAILURES
    pub strict: bool,
}

/// Register every `[[verifiers]]` entry as a command verifier
pub fn build_controller(config: &Config) -> Controller {
    let mut controller = Controller::new(config.controller_config());
    for verifier in &config.verifiers {
        controller.register_verifier(
            verifier.name.clone(),
            Arc::new(CommandVerifier::from_config(verifier)),
        );
    }
    controller
}

pub fn execute(ctx: &CommandContext, args: RunArgs) -> Result<()> {
    let controller = build_controller(&ctx.config);
    if controller.registered_modules().is_empty() {
        bail!("No verifiers configured. Add [[verifiers]] entries to verity.toml");
    }

    let results = match &args.module {
        Some(module) => vec![controller.run_module(module)?],
        None => controller.run_full(),
    };

    let mut metadata = ctx.config.report_metadata();
    metadata.git_commit = args.commit.clone();
    metadata.branch = args.branch.clone();
    metadata.tags.extend(args.tags.iter().cloned());

    let generator = ctx.generator();
    let options = ReportOptions {
        include_recommendations: true,
        auto_store: !args.no_store,
        metadata,
    };
    let generated = generator.generate_report(&results, &options)?;
    let report = &generated.report;

    if args.json {
        match &generated.stored {
            Some(stored) => print_json(stored)?,
            None => print_json(report)?,
        }
    } else {
        println!("{}", generate_summary_text(&results));

        if !report.recommendations.is_empty() {
            println!("\n{}", "Recommendations".bold());
            for rec in &report.recommendations {
                println!(
                    "  {} {}: {}",
                    severity_label(rec.severity),
                    rec.component,
                    rec.issue
                );
                println!("      {}", rec.solution.dimmed());
            }
        }

        match &generated.stored {
            Some(stored) => println!("\n{} Stored report {}", "✓".green(), stored.id.bold()),
            None => println!("\n{}", "Report not stored (--no-store)".dimmed()),
        }
        println!("Overall status: {}", overall_label(report.overall_status));
    }

    info!(status = %report.overall_status, "Verification run finished");
    match report.overall_status {
        OverallStatus::CriticalFailures => {
            bail!("Verification finished with status {}", report.overall_status)
        }
        OverallStatus::IssuesFound if args.strict => {
            bail!("Verification finished with status {}", report.overall_status)
        }
        _ => Ok(()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn context(toml: &str, dir: &std::path::Path) -> CommandContext {
        let mut config = Config::parse(toml).unwrap();
        config.storage.dir = dir.to_path_buf();
        CommandContext { config }
    }

    #[test]
    fn test_build_controller_registers_configured_verifiers() {
        let config = Config::parse(
            "[[verifiers]]\nname = \"a\"\ncommands = [\"true\"]\n[[verifiers]]\nname = \"b\"\n",
        )
        .unwrap();
        let controller = build_controller(&config);
        assert_eq!(controller.registered_modules(), vec!["a", "b"]);
    }

    #[test]
    fn test_run_stores_report() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context("[[verifiers]]\nname = \"shell\"\ncommands = [\"true\"]\n", temp.path());

        execute(
            &ctx,
            RunArgs {
                json: true,
                tags: vec!["ci".into()],
                ..RunArgs::default()
            },
        )
        .unwrap();

        let reports = ctx.storage().get_all_reports(None, None, None);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report.overall_status, OverallStatus::Healthy);
        assert!(reports[0].metadata.tags.contains(&"ci".to_string()));
    }

    #[test]
    fn test_run_without_verifiers_fails() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context("", temp.path());
        assert!(execute(&ctx, RunArgs::default()).is_err());
    }

    #[test]
    fn test_run_unknown_module_fails_without_storing() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context("[[verifiers]]\nname = \"shell\"\ncommands = [\"true\"]\n", temp.path());

        let err = execute(
            &ctx,
            RunArgs {
                module: Some("missing".into()),
                ..RunArgs::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(ctx.storage().get_all_reports(None, None, None).is_empty());
    }

    #[test]
    fn test_failing_verifier_is_issues_found_unless_strict() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(
            "[[verifiers]]\nname = \"shell\"\ncommands = [\"exit 1\"]\n",
            temp.path(),
        );

        assert!(execute(&ctx, RunArgs { no_store: true, ..RunArgs::default() }).is_ok());
        assert!(execute(
            &ctx,
            RunArgs {
                no_store: true,
                strict: true,
                ..RunArgs::default()
            }
        )
        .is_err());
    }
}
