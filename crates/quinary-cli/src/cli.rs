//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use quinary_model::AnchorMode;

#[derive(Parser)]
#[command(
    name = "quinary",
    version,
    about = "Encode clinical-trial event tables as weekly quinary use-pattern words",
    long_about = "Align drug-use tests, clinic visits, randomizations and doses on a\n\
                  per-subject weekly grid and encode each trial phase as a word over\n\
                  the alphabet + - * o _."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the word table.
    Encode(EncodeArgs),

    /// Load and validate inputs and configuration without encoding.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct EncodeArgs {
    /// Folder holding drug_use.csv, visits.csv, randomization.csv, dose.csv
    /// and project.csv.
    #[arg(value_name = "STUDY_FOLDER")]
    pub study_folder: PathBuf,

    /// Pipeline configuration (TOML).
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: PathBuf,

    /// Output directory for generated files (default: <STUDY_FOLDER>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the week-0 anchor from the configuration.
    #[arg(long = "anchor", value_enum)]
    pub anchor: Option<AnchorArg>,

    /// Also write backbone, imputed visit, induction delay and weekly tables.
    #[arg(long = "intermediate")]
    pub intermediate: bool,

    /// Run and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Folder holding the five input tables.
    #[arg(value_name = "STUDY_FOLDER")]
    pub study_folder: PathBuf,

    /// Pipeline configuration (TOML).
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: PathBuf,
}

/// Week-0 anchor choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum AnchorArg {
    IntentToTreat,
    AsTreated,
}

impl From<AnchorArg> for AnchorMode {
    fn from(value: AnchorArg) -> Self {
        match value {
            AnchorArg::IntentToTreat => AnchorMode::IntentToTreat,
            AnchorArg::AsTreated => AnchorMode::AsTreated,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
