use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use comfy_table::{presets, Row, Table};
use polars::prelude::*;

use super::ColumnArgs;
use crate::encoding::LabelEncoder;
use crate::prelude::*;
use crate::splitter::{Outcome, Splitter};
use crate::table::{
    gloss_counts, read_table, samples, with_subsets, write_gloss_counts,
    write_table,
};

/// Split a sample table into participant-disjoint train, val and test
/// subsets with identical label sets.
#[derive(Debug, Parser)]
pub(crate) struct Split {
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

    /// The number of candidate splits to evaluate. By default the
    /// value of `split.trials` is used.
    #[arg(short = 'n', long, value_name = "n")]
    trials: Option<usize>,

    /// The seed used to draw the seeds of the candidate splits. By
    /// default the value of `split.seed` is used.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Fail, if a label occurs in fewer groups than there are
    /// subsets, instead of dropping its samples.
    #[arg(long)]
    strict: bool,

    /// Append the integer columns `label_code` and `group_code`. Unless
    /// given explicitly, the mappings are written next to the output
    /// (`<output>.labels.json` and `<output>.groups.json`).
    #[arg(long)]
    encode: bool,

    /// Write the label mapping (code to gloss) into `filename`.
    #[arg(long, value_name = "filename")]
    labels_out: Option<PathBuf>,

    /// Write the group mapping (code to participant) into `filename`.
    #[arg(long, value_name = "filename")]
    groups_out: Option<PathBuf>,

    /// Write the frequencies of the remaining glosses into `filename`
    /// (in CSV format).
    #[arg(long, value_name = "filename")]
    glosses_out: Option<PathBuf>,

    /// Write the split table into `filename`. By default output will
    /// be written in CSV format to the standard output (`stdout`).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The sample table (CSV).
    path: PathBuf,
}

#[inline]
fn label_of<'a>(sample: &&'a Sample) -> &'a str {
    sample.label.as_str()
}

#[inline]
fn group_of<'a>(sample: &&'a Sample) -> &'a str {
    sample.group.as_str()
}

fn print_summary(outcome: &Outcome) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(Row::from(vec![
        "subset", "samples", "groups", "labels",
    ]));

    for summary in outcome.summary.iter() {
        table.add_row([
            summary.subset.to_string(),
            summary.samples.to_string(),
            summary.groups.to_string(),
            summary.labels.to_string(),
        ]);
    }

    eprintln!("{table}");
}

impl Split {
    /// Returns the destinations of the label and group mappings. The
    /// codes appended by `--encode` must always be decodable, so their
    /// mappings default to files beside the output table.
    fn mapping_paths(
        &self,
    ) -> SignprepResult<(Option<PathBuf>, Option<PathBuf>)> {
        let beside_output = |explicit: &Option<PathBuf>, kind: &str| {
            match (explicit, &self.output) {
                (Some(path), _) => Ok(Some(path.clone())),
                (None, _) if !self.encode => Ok(None),
                (None, Some(output)) => {
                    Ok(Some(output.with_extension(format!("{kind}.json"))))
                }
                (None, None) => Err(SignprepError::other(format!(
                    "`--encode` requires `--{kind}-out` when the table \
                        is written to stdout"
                ))),
            }
        };

        Ok((
            beside_output(&self.labels_out, "labels")?,
            beside_output(&self.groups_out, "groups")?,
        ))
    }

    pub(crate) fn execute(self, config: &Config) -> SignprepResult<()> {
        let (labels_out, groups_out) = self.mapping_paths()?;
        let columns = self.columns.resolve(&config.columns);
        let df = read_table(&self.path)?;
        let samples = samples(&df, &columns)?;

        let splitter = Splitter::new(
            config.split.ratios()?,
            self.trials.unwrap_or(config.split.trials),
            self.seed.unwrap_or(config.split.seed),
        )
        .strict(self.strict || config.split.strict)
        .quiet(self.quiet);

        let outcome = splitter.split(&samples)?;
        let retained: Vec<&Sample> = samples
            .iter()
            .zip(outcome.subsets.iter())
            .filter_map(|(sample, subset)| subset.map(|_| sample))
            .collect();

        log::info!(
            "kept {} of {} samples with {} label(s) (seed {}), dropped \
                {} ineligible label(s)",
            retained.len(),
            samples.len(),
            outcome.labels.len(),
            outcome.seed,
            outcome.ineligible.len()
        );

        let mut out =
            with_subsets(&df, &outcome.subsets, &columns.subset)?;

        let labels = LabelEncoder::fit(retained.iter().map(label_of));
        let groups = LabelEncoder::fit(retained.iter().map(group_of));

        if self.encode {
            let label_codes = labels.transform(retained.iter().map(label_of))?;
            let group_codes = groups.transform(retained.iter().map(group_of))?;

            out.with_column(Series::new("label_code", label_codes))?;
            out.with_column(Series::new("group_code", group_codes))?;
        }

        if let Some(path) = labels_out {
            log::info!("write label mapping to {}", path.display());
            labels.save(path)?;
        }

        if let Some(path) = groups_out {
            log::info!("write group mapping to {}", path.display());
            groups.save(path)?;
        }

        if let Some(path) = self.glosses_out {
            let counts = gloss_counts(retained.iter().map(label_of));
            write_gloss_counts(File::create(path)?, &counts)?;
        }

        if !self.quiet {
            print_summary(&outcome);
        }

        write_table(&mut out, self.output.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    fn split(args: &[&str]) -> Split {
        Split::parse_from(["split"].iter().chain(args).chain(&["in.csv"]))
    }

    #[test]
    fn encode_writes_mappings_beside_output() -> TestResult {
        let cmd = split(&["--encode", "-o", "out/split.csv"]);
        let (labels, groups) = cmd.mapping_paths()?;

        assert_eq!(labels, Some(PathBuf::from("out/split.labels.json")));
        assert_eq!(groups, Some(PathBuf::from("out/split.groups.json")));
        Ok(())
    }

    #[test]
    fn explicit_mapping_paths() -> TestResult {
        let cmd = split(&[
            "--encode",
            "--labels-out",
            "glosses.json",
            "-o",
            "split.csv",
        ]);

        let (labels, groups) = cmd.mapping_paths()?;
        assert_eq!(labels, Some(PathBuf::from("glosses.json")));
        assert_eq!(groups, Some(PathBuf::from("split.groups.json")));

        let cmd = split(&["--groups-out", "groups.json"]);
        let (labels, groups) = cmd.mapping_paths()?;
        assert_eq!(labels, None);
        assert_eq!(groups, Some(PathBuf::from("groups.json")));
        Ok(())
    }

    #[test]
    fn encode_to_stdout_requires_mapping_paths() -> TestResult {
        assert!(split(&["--encode"]).mapping_paths().is_err());
        assert!(split(&["--encode", "--labels-out", "l.json"])
            .mapping_paths()
            .is_err());

        let cmd = split(&[
            "--encode",
            "--labels-out",
            "l.json",
            "--groups-out",
            "g.json",
        ]);
        assert!(cmd.mapping_paths()?.0.is_some());

        assert_eq!(split(&[]).mapping_paths()?, (None, None));
        Ok(())
    }
}
