//! `verity export`: write a stored report as json, html or pdf (html)

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::common::CommandContext;
use crate::storage::{ExportFormat, ExportOptions};

pub struct ExportArgs {
    pub id: String,
    pub format: String,
    pub output: Option<PathBuf>,
    pub include_history: bool,
    pub include_charts: bool,
}

pub fn execute(ctx: &CommandContext, args: ExportArgs) -> Result<()> {
    let options = ExportOptions {
        format: ExportFormat::parse_lenient(&args.format),
        include_history: args.include_history,
        include_charts: args.include_charts,
    };

    let path = ctx
        .storage()
        .export_report(&args.id, &options, args.output.as_deref())?;

    println!("{} Exported {} to {}", "✓".green(), args.id.bold(), path.display());
    if options.format == ExportFormat::Pdf {
        println!(
            "  {}",
            "PDF rendering is not built in; print the HTML file to PDF with a browser".dimmed()
        );
    }
    Ok(())
}
