use std::io::ErrorKind;
use std::process;

use clap::Parser;
use cli::{Args, Command};
use error::{SignprepError, SignprepResult};
use polars::error::PolarsError;
use rayon::ThreadPoolBuilder;

pub(crate) mod prelude {
    pub(crate) use crate::config::Config;
    pub(crate) use crate::error::{
        bail, SignprepError, SignprepResult,
    };
    pub(crate) use crate::progress::ProgressBarBuilder;
    pub(crate) use crate::sample::{Sample, Subset};
}

mod cleaner;
mod cli;
mod commands;
mod config;
mod encoding;
mod error;
mod partition;
mod progress;
mod sample;
mod search;
mod segment;
mod splitter;
mod table;
mod verify;

fn num_threads(args: &Args) -> usize {
    if let Some(num_threads) = args.num_jobs {
        return num_threads;
    }

    if let Ok(config) = config::Config::load(args.config.as_ref()) {
        if let Some(runtime) = config.runtime {
            if let Some(num_threads) = runtime.num_jobs {
                return num_threads;
            }
        }
    }

    0
}

fn run(args: Args) -> SignprepResult<()> {
    let load = || config::Config::load(args.config.as_ref());

    match args.cmd {
        Command::Clean(cmd) => cmd.execute(&load()?),
        Command::Completions(cmd) => cmd.execute(),
        Command::Config(cmd) => cmd.execute(args.config.as_ref()),
        Command::Decode(cmd) => cmd.execute(&load()?),
        Command::Init(cmd) => cmd.execute(args.config.as_ref()),
        Command::Segments(cmd) => cmd.execute(&load()?),
        Command::Split(cmd) => cmd.execute(&load()?),
        Command::Verify(cmd) => cmd.execute(&load()?),
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.cmd.log_level())
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(num_threads(&args))
        .build_global()
    {
        log::warn!("unable to configure the thread pool: {e}");
    }

    match run(args) {
        Ok(()) => process::exit(0),
        Err(SignprepError::IO(e)) if e.kind() == ErrorKind::BrokenPipe => {
            process::exit(0)
        }
        Err(SignprepError::Polars(PolarsError::IO { error, .. }))
            if error.kind() == ErrorKind::BrokenPipe =>
        {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
