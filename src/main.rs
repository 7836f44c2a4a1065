//! rustwos - citation reports from Web of Science exports
//!
//! Matches the cited references of a citing corpus against a corpus of
//! canonical papers and writes a per-paper citation report.
//!
//! ## Usage
//!
//! ### Report
//! ```bash
//! rustwos report --papers data/papers.txt --citing data/citing_1_500.txt data/citing_501_1000.txt
//! ```
//!
//! ### Diagnostics
//! ```bash
//! rustwos inspect --papers data/papers.txt --citing data/citing_1_500.txt
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustwos::config::{Config, Overrides};
use rustwos::matcher::VenueRule;
use rustwos::{pipeline, source};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Citation reports from Web of Science tagged-field exports
#[derive(Parser)]
#[command(name = "rustwos")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match citations and write the report, CSV and summary
    Report {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First line of the text report
        #[arg(long)]
        title: Option<String>,

        /// Venue rendering for constructed guesses
        #[arg(long, value_parser = ["volume-only", "journal-and-volume"])]
        venue_rule: Option<String>,
    },

    /// Print field and UID diagnostics as JSON
    Inspect {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export files holding the canonical papers
    #[arg(long, num_args = 1..)]
    papers: Vec<PathBuf>,

    /// Export files holding the citing records
    #[arg(long, num_args = 1..)]
    citing: Vec<PathBuf>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report {
            inputs,
            output,
            title,
            venue_rule,
        } => run_report(inputs, output, title, venue_rule),
        Commands::Inspect { inputs } => run_inspect(inputs),
    }
}

fn load_config(inputs: InputArgs, overrides: Overrides) -> Result<Config> {
    let config = Config::load_or_default(inputs.config.as_deref())
        .context("Failed to load config file")?;
    Ok(config.apply(Overrides {
        papers: inputs.papers,
        citing: inputs.citing,
        ..overrides
    }))
}

// ============================================================================
// Commands
// ============================================================================

fn run_report(
    inputs: InputArgs,
    output: Option<PathBuf>,
    title: Option<String>,
    venue_rule: Option<String>,
) -> Result<()> {
    let venue_rule = venue_rule
        .map(|rule| rule.parse::<VenueRule>())
        .transpose()
        .context("Invalid --venue-rule")?;

    let config = load_config(
        inputs,
        Overrides {
            output_dir: output,
            title,
            venue_rule,
            ..Overrides::default()
        },
    )?;
    info!(
        papers = config.papers.len(),
        citing = config.citing.len(),
        venue_rule = %config.venue_rule,
        "Starting report"
    );

    let outputs = pipeline::run_report(&config).context("Report failed")?;

    println!("Saved: {:?}", outputs.report);
    println!("Saved: {:?}", outputs.citations);
    println!("Saved: {:?}", outputs.summary);
    Ok(())
}

fn run_inspect(inputs: InputArgs) -> Result<()> {
    let config = load_config(inputs, Overrides::default())?;
    config.validate()?;

    let papers = source::load_records(&config.papers).context("Failed to load papers")?;
    let citing = source::load_records(&config.citing).context("Failed to load citing records")?;

    let diagnostics = pipeline::diagnose(&papers, &citing);
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);

    if !diagnostics.duplicate_uid_groups.is_empty() {
        anyhow::bail!(
            "{} UIDs are shared by more than one paper",
            diagnostics.duplicate_uid_groups.len()
        );
    }
    Ok(())
}
