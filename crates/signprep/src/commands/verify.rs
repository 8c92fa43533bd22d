use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use super::ColumnArgs;
use crate::prelude::*;
use crate::table::{read_table, samples, string_column};
use crate::verify::verify;

/// Verify that an existing split is participant-disjoint and that all
/// subsets share the same label set.
#[derive(Debug, Parser)]
pub(crate) struct Verify {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    pub(crate) verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    #[command(flatten)]
    columns: ColumnArgs,

    /// The split table (CSV).
    path: PathBuf,
}

impl Verify {
    pub(crate) fn execute(self, config: &Config) -> SignprepResult<()> {
        let columns = self.columns.resolve(&config.columns);
        let df = read_table(&self.path)?;
        let samples = samples(&df, &columns)?;

        let subsets = string_column(&df, &columns.subset)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(value) => Subset::from_str(value).map(Some),
                None => bail!(
                    "verification failed: missing subset (row {row})"
                ),
            })
            .collect::<SignprepResult<Vec<_>>>()?;

        let summary = verify(&samples, &subsets).map_err(|e| match e {
            SignprepError::Invariant(msg) => {
                SignprepError::other(format!("verification failed: {msg}"))
            }
            e => e,
        })?;

        for entry in summary.iter() {
            log::info!(
                "{}: {} samples, {} groups, {} labels",
                entry.subset,
                entry.samples,
                entry.groups,
                entry.labels
            );
        }

        if !self.quiet {
            println!("OK, split is consistent.");
        }

        Ok(())
    }
}
