use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use hashbrown::HashSet;
use polars::prelude::*;

use super::ColumnArgs;
use crate::cleaner::Cleaner;
use crate::prelude::*;
use crate::table::{
    gloss_counts, read_table, string_column, write_gloss_counts,
    write_table,
};

/// Normalize glosses and drop unwanted annotations.
#[derive(Debug, Parser)]
pub(crate) struct Clean {
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

    /// Ignore glosses with fewer than `count` occurrences. By default
    /// the value of `clean.min-count` is used.
    #[arg(short = 'm', long, value_name = "count")]
    min_count: Option<usize>,

    /// Write the frequencies of the remaining glosses into `filename`
    /// (in CSV format).
    #[arg(long, value_name = "filename")]
    glosses_out: Option<PathBuf>,

    /// Write the cleaned table into `filename`. By default output will
    /// be written in CSV format to the standard output (`stdout`).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The sample table (CSV).
    path: PathBuf,
}

fn log_stage<'a, I>(stage: &str, glosses: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut samples = 0;
    let mut unique = HashSet::new();
    for gloss in glosses {
        samples += 1;
        unique.insert(gloss);
    }

    log::info!(
        "{stage}: {} unique gloss(es) in {samples} sample(s)",
        unique.len()
    );
}

fn kept<'a>(
    glosses: &'a [String],
    keep: &'a [bool],
) -> impl Iterator<Item = &'a str> + 'a {
    glosses
        .iter()
        .zip(keep.iter())
        .filter(|(_, keep)| **keep)
        .map(|(gloss, _)| gloss.as_str())
}

impl Clean {
    pub(crate) fn execute(self, config: &Config) -> SignprepResult<()> {
        let columns = self.columns.resolve(&config.columns);
        let cleaner = Cleaner::from_config(&config.clean)?;
        let min_count =
            self.min_count.or(config.clean.min_count).unwrap_or(1);

        let mut df = read_table(&self.path)?;
        let labels = string_column(&df, &columns.label)?;
        let groups = string_column(&df, &columns.group)?;

        log_stage("input", labels.into_iter().flatten());

        let mut normalized = Vec::with_capacity(df.height());
        let mut keep = Vec::with_capacity(df.height());

        for (label, group) in labels.into_iter().zip(groups.into_iter()) {
            let gloss = cleaner.normalize(label.unwrap_or_default());
            let wanted = cleaner.is_wanted(&gloss)
                && !group.map_or(true, |g| cleaner.is_dropped_group(g));

            normalized.push(gloss);
            keep.push(wanted);
        }

        log_stage("filtered", kept(&normalized, &keep));

        let counts = gloss_counts(kept(&normalized, &keep));
        let frequent: HashSet<String> = counts
            .into_iter()
            .filter(|entry| entry.count >= min_count as u64)
            .map(|entry| entry.gloss)
            .collect();

        for (gloss, keep) in normalized.iter().zip(keep.iter_mut()) {
            *keep = *keep && frequent.contains(gloss);
        }

        log_stage(
            &format!("min-count {min_count}"),
            kept(&normalized, &keep),
        );

        df.with_column(Series::new(&columns.label, &normalized))?;
        let mut df =
            df.filter(&BooleanChunked::new("keep", keep.as_slice()))?;

        if let Some(path) = self.glosses_out {
            let counts = gloss_counts(kept(&normalized, &keep));
            write_gloss_counts(File::create(path)?, &counts)?;
        }

        write_table(&mut df, self.output.as_ref())
    }
}
