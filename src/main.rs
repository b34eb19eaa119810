use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use verity::commands::{
    cleanup, compare, completions, dashboard, export, init, list, run, show, trends,
    CommandContext,
};
use verity::logging::init_logging;
use verity::validation::clap_id_validator;

#[derive(Parser)]
#[command(name = "verity")]
#[command(about = "Verification orchestration and historical reporting CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ./verity.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report storage directory, overriding the config file
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the report storage layout
    Init {
        /// Also write a starter verity.toml if none exists
        #[arg(long)]
        with_config: bool,
    },

    /// Run the configured verifiers and store the report
    Run {
        /// Run a single verifier (alphanumeric, dash, underscore only; max 128 characters)
        #[arg(short, long, value_parser = clap_id_validator)]
        module: Option<String>,

        /// Do not persist the report
        #[arg(long)]
        no_store: bool,

        /// Git commit recorded in the report metadata
        #[arg(long)]
        commit: Option<String>,

        /// Branch recorded in the report metadata
        #[arg(long)]
        branch: Option<String>,

        /// Tag recorded in the report metadata (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Exit non-zero on ISSUES_FOUND, not only on CRITICAL_FAILURES
        #[arg(long)]
        strict: bool,

        /// Print the stored report as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// List stored reports, newest first
    List {
        /// Maximum number of reports
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Only reports from the last N days
        #[arg(long)]
        since_days: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Show a stored report (latest when no id is given)
    Show {
        #[arg(value_parser = clap_id_validator)]
        id: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Export a stored report
    Export {
        #[arg(value_parser = clap_id_validator)]
        id: String,

        /// json, html or pdf (pdf is written as HTML); unknown formats fall back to json
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output path (default: <storage>/exports/report-<id>-<timestamp>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Attach 30-day trends
        #[arg(long)]
        history: bool,

        /// Draw trend sparklines in HTML output
        #[arg(long)]
        charts: bool,
    },

    /// Compare two stored reports (defaults to the two newest)
    Compare {
        #[arg(value_parser = clap_id_validator)]
        current: Option<String>,

        #[arg(value_parser = clap_id_validator)]
        previous: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show metric trends
    Trends {
        /// Window size in days
        #[arg(short, long, default_value_t = trends::DEFAULT_TREND_DAYS)]
        days: u32,

        #[arg(long)]
        json: bool,
    },

    /// Show system health, recent reports and 7-day trends
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Delete reports beyond the retention limit
    Cleanup {
        /// List what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        return completions::execute(&mut cmd, shell);
    }

    let ctx = CommandContext::load(cli.config.as_deref(), cli.storage_dir)?;

    match cli.command {
        Commands::Init { with_config } => init::execute(&ctx, with_config),
        Commands::Run {
            module,
            no_store,
            commit,
            branch,
            tags,
            strict,
            json,
        } => run::execute(
            &ctx,
            run::RunArgs {
                module,
                no_store,
                commit,
                branch,
                tags,
                json,
                strict,
            },
        ),
        Commands::List {
            limit,
            since_days,
            json,
        } => list::execute(&ctx, limit, since_days, json),
        Commands::Show { id, json } => show::execute(&ctx, id, json),
        Commands::Export {
            id,
            format,
            output,
            history,
            charts,
        } => export::execute(
            &ctx,
            export::ExportArgs {
                id,
                format,
                output,
                include_history: history,
                include_charts: charts,
            },
        ),
        Commands::Compare {
            current,
            previous,
            json,
        } => compare::execute(&ctx, current, previous, json),
        Commands::Trends { days, json } => trends::execute(&ctx, days, json),
        Commands::Dashboard { json } => dashboard::execute(&ctx, json),
        Commands::Cleanup { dry_run, json } => cleanup::execute(&ctx, dry_run, json),
        // Handled before the config is loaded
        Commands::Completions { .. } => Ok(()),
    }
}
