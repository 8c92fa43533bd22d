use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None, max_term_width = 72)]
pub(crate) struct Args {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    #[clap(
        short = 'j',
        long,
        env = "SIGNPREP_NUM_JOBS",
        hide_env_values = true
    )]
    pub(crate) num_jobs: Option<usize>,

    /// Use the config `filename` instead of searching for a
    /// `signprep.toml` in the current directory and its parents.
    #[arg(long, global = true, value_name = "filename")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    Clean(Clean),
    Completions(Completions),
    Config(Config),
    Decode(Decode),
    #[clap(alias = "new")]
    Init(Init),
    Segments(Segments),
    Split(Split),
    Verify(Verify),
}

impl Command {
    /// Returns the log level requested by the `--verbose` and
    /// `--quiet` flags of the command.
    pub(crate) fn log_level(&self) -> LevelFilter {
        let (verbose, quiet) = match self {
            Self::Clean(cmd) => (cmd.verbose, cmd.quiet),
            Self::Decode(cmd) => (cmd.verbose, cmd.quiet),
            Self::Init(cmd) => (cmd.verbose, cmd.quiet),
            Self::Segments(cmd) => (cmd.verbose, cmd.quiet),
            Self::Split(cmd) => (cmd.verbose, cmd.quiet),
            Self::Verify(cmd) => (cmd.verbose, cmd.quiet),
            Self::Completions(_) | Self::Config(_) => (false, false),
        };

        match (verbose, quiet) {
            (true, _) => LevelFilter::Info,
            (_, true) => LevelFilter::Error,
            _ => LevelFilter::Warn,
        }
    }
}
