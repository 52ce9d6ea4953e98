//! irpi-eval CLI - 1:N identification engine benchmark

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Benchmark harness for 1:N image identification engines.
#[derive(Parser)]
#[command(name = "irpi-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging, per-template events)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full benchmark against an engine
    Run(RunArgs),

    /// Show how a dataset would be split into subjects, probes and distractors
    Inspect {
        /// Dataset root
        path: PathBuf,

        /// Enrollment templates per person
        #[arg(short = 'e', long, default_value_t = 1)]
        enroll_per_person: usize,

        /// Identification templates per person
        #[arg(short = 'n', long, default_value_t = 1)]
        ident_per_person: usize,

        /// Include loose root images as distractors
        #[arg(short, long)]
        distractors: bool,
    },

    /// Print a stored report
    Summary {
        /// Report JSON file
        report: PathBuf,

        /// Also print the curves
        #[arg(long)]
        curves: bool,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Decode images as 8-bit grayscale instead of 24-bit RGB
    #[arg(short, long)]
    grayscale: bool,

    /// Dataset root with one subdirectory per subject
    #[arg(short, long, default_value = "")]
    input: PathBuf,

    /// Directory receiving the report
    #[arg(short, long, default_value = "")]
    output: PathBuf,

    /// Directory the engine loads its resources from
    #[arg(short, long, default_value = "")]
    resources: PathBuf,

    /// Enrollment templates per person
    #[arg(short = 'e', long, default_value_t = 1)]
    enroll_per_person: usize,

    /// Identification templates per person
    #[arg(short = 'n', long, default_value_t = 1)]
    ident_per_person: usize,

    /// Candidate list length per search
    #[arg(short, long, default_value_t = 64)]
    candidates: usize,

    /// Number of DET curve points
    #[arg(short = 'p', long, default_value_t = 10_000)]
    det_points: usize,

    /// Search loose root images as distractors
    #[arg(short, long)]
    distractors: bool,

    /// Shuffle search templates before searching
    #[arg(short, long)]
    shuffle: bool,

    /// Shuffle seed (random when omitted)
    #[arg(long, requires = "shuffle")]
    seed: Option<u64>,

    /// Replace an existing report
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Engine to benchmark
    #[arg(long, default_value = "null")]
    engine: String,

    /// Also write CMC/DET plots as SVG
    #[arg(long)]
    charts: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Inspect { path, enroll_per_person, ident_per_person, distractors } => {
            commands::inspect::run(&path, enroll_per_person, ident_per_person, distractors)
        }
        Commands::Summary { report, curves } => commands::summary::run(&report, curves),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<irpi_eval::Error>()
                .map_or(1, irpi_eval::Error::exit_code);
            ExitCode::from(code)
        }
    }
}
