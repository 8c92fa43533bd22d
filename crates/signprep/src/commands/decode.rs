use std::path::PathBuf;

use clap::Parser;
use polars::prelude::*;

use crate::encoding::LabelEncoder;
use crate::prelude::*;
use crate::table::{read_table, string_column, write_table};

/// Map integer codes back to their glosses.
#[derive(Debug, Parser)]
pub(crate) struct Decode {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    pub(crate) verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// The mapping (code to gloss) written by `signprep split`.
    #[arg(short, long, value_name = "filename")]
    mapping: PathBuf,

    /// The name of the column containing the codes.
    #[arg(short, long, default_value = "label_code")]
    column: String,

    /// The name of the column receiving the decoded values. By default
    /// the value of `columns.label` is used.
    #[arg(short, long)]
    target: Option<String>,

    /// Write the decoded table into `filename`. By default output will
    /// be written in CSV format to the standard output (`stdout`).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The table with the encoded column (CSV).
    path: PathBuf,
}

fn decode_column(
    encoder: &LabelEncoder,
    codes: &StringChunked,
) -> SignprepResult<Vec<Option<String>>> {
    codes
        .into_iter()
        .map(|value| {
            let Some(value) = value else {
                return Ok(None);
            };

            let code = value.trim().parse::<u32>().map_err(|_| {
                SignprepError::other(format!("invalid code `{value}`"))
            })?;

            match encoder.decode(code) {
                Some(label) => Ok(Some(label.to_string())),
                None => bail!("unknown code {code}"),
            }
        })
        .collect()
}

impl Decode {
    pub(crate) fn execute(self, config: &Config) -> SignprepResult<()> {
        let target = self
            .target
            .unwrap_or_else(|| config.columns.label.clone());
        let encoder = LabelEncoder::load(&self.mapping)?;
        log::info!(
            "loaded mapping with {} class(es) from {}",
            encoder.len(),
            self.mapping.display()
        );

        let mut df = read_table(&self.path)?;
        let decoded =
            decode_column(&encoder, string_column(&df, &self.column)?)?;

        df.with_column(Series::new(&target, decoded))?;
        write_table(&mut df, self.output.as_ref())
    }
}
