//! Pilet Data CLI - replay data scripts against the shared store

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;

use pilet_data::{DataError, FixSuggestion, Runner, Script, StepOutcome};

#[derive(Parser)]
#[command(name = "pilet-data")]
#[command(about = "Shared, observable key-value data store for pilets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a data script and print the resulting state
    Run {
        /// Path to the script (.yaml)
        file: String,

        /// Also print the event log
        #[arg(short, long)]
        events: bool,

        /// Print one JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a data script (parse only)
    Validate {
        /// Path to the script (.yaml)
        file: String,
    },
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { file, events, json } => run_script(&file, events, json),
        Commands::Validate { file } => validate_script(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_script(file: &str) -> Result<Script, DataError> {
    let yaml = fs::read_to_string(file)?;
    Script::from_yaml(&yaml)
}

fn run_script(file: &str, show_events: bool, json: bool) -> Result<(), DataError> {
    let runner = Runner::new(load_script(file)?)?;
    let report = runner.run();

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        return Ok(());
    }

    for (index, outcome) in report.outcomes.iter().enumerate() {
        let marker = match outcome {
            StepOutcome::TryWrite { accepted: false, .. } => "✗".red(),
            StepOutcome::Skipped => "·".dimmed(),
            _ => "✓".green(),
        };
        println!("{} {:>3}. {}", marker, index + 1, outcome);
    }

    println!("{}", "State:".cyan().bold());
    println!("{}", serde_json::to_string_pretty(&report.state.to_json())?);

    if show_events {
        println!("{}", "Events:".cyan().bold());
        println!("{}", serde_json::to_string_pretty(&report.events)?);
    }

    Ok(())
}

fn validate_script(file: &str) -> Result<(), DataError> {
    let script = load_script(file)?;
    script.validate()?;
    let initial = script.initial_state()?;

    println!("{} Script '{}' is valid", "✓".green(), file);
    println!("  Steps: {}", script.count_steps());
    println!("  Initial items: {}", initial.app.data.len());

    Ok(())
}
