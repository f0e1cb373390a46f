//! Vibrato CLI - Command-line interface for vibrato perception stimuli
//!
//! This binary validates analyzed cycles and experiment plans, renders single
//! conditions, and lays out full experiments on disk.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vibrato_cli::commands;

/// Vibrato - stimulus synthesis for vibrato perception experiments
#[derive(Parser)]
#[command(name = "vibrato")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an analyzed cycle against an experiment plan
    Validate {
        /// Path to the analyzed cycle JSON file
        #[arg(short, long)]
        cycle: PathBuf,

        /// Path to the experiment plan JSON file (default plan if omitted)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Render a single condition to a WAV file
    Render {
        /// Path to the analyzed cycle JSON file
        #[arg(short, long)]
        cycle: PathBuf,

        /// Condition name (BASIC, FROZEN, SHUFFLE, SHUFFLE_RAF, ...)
        #[arg(long)]
        condition: String,

        /// Output WAV path
        #[arg(short, long)]
        out: PathBuf,

        /// RNG seed (overrides the plan's seed)
        #[arg(short, long)]
        seed: Option<u32>,

        /// Path to the experiment plan JSON file for stimulus settings
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Write the morph log as JSON to this path
        #[arg(long)]
        log_json: Option<PathBuf>,
    },

    /// Render every subject, block, and repeat of an experiment plan
    Experiment {
        /// Path to the analyzed cycle JSON file
        #[arg(short, long)]
        cycle: PathBuf,

        /// Path to the experiment plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Output root directory
        #[arg(short, long)]
        out_root: PathBuf,
    },

    /// Summarize an analyzed cycle
    Inspect {
        /// Path to the analyzed cycle JSON file
        #[arg(short, long)]
        cycle: PathBuf,

        /// Path to the experiment plan JSON file for f0 and partial count
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Number of partials to list
        #[arg(long, default_value_t = 10)]
        partials: usize,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate { cycle, plan } => commands::validate::run(&cycle, plan.as_deref()),
        Commands::Render {
            cycle,
            condition,
            out,
            seed,
            plan,
            log_json,
        } => commands::render::run(&commands::render::RenderArgs {
            cycle: &cycle,
            condition: &condition,
            out: &out,
            seed,
            plan: plan.as_deref(),
            log_json: log_json.as_deref(),
        }),
        Commands::Experiment {
            cycle,
            plan,
            out_root,
        } => commands::experiment::run(&cycle, &plan, &out_root),
        Commands::Inspect {
            cycle,
            plan,
            partials,
        } => commands::inspect::run(&cycle, plan.as_deref(), partials),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
