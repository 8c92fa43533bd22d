use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use polars::prelude::*;
use serde::Serialize;

use crate::config::Columns;
use crate::prelude::*;

/// Reads a delimited sample table. All columns are read as strings,
/// so that identifiers like `007` are preserved.
pub(crate) fn read_table<P: AsRef<Path>>(
    path: P,
) -> SignprepResult<DataFrame> {
    Ok(CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.as_ref().into()))?
        .finish()?)
}

/// Writes the table in CSV format into `output` or, if no filename is
/// given, to the standard output.
pub(crate) fn write_table(
    df: &mut DataFrame,
    output: Option<&PathBuf>,
) -> SignprepResult<()> {
    match output {
        Some(path) => {
            let mut writer = CsvWriter::new(File::create(path)?);
            writer.finish(df)?;
        }
        None => {
            let mut writer = CsvWriter::new(io::stdout().lock());
            writer.finish(df)?;
        }
    }

    Ok(())
}

/// Returns the string column `name` or fails with
/// [SignprepError::MissingColumn].
pub(crate) fn string_column<'a>(
    df: &'a DataFrame,
    name: &str,
) -> SignprepResult<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| SignprepError::MissingColumn(name.into()))?;

    Ok(column.str()?)
}

fn values(ca: &StringChunked, name: &str) -> SignprepResult<Vec<String>> {
    ca.into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(value) => Ok(value.to_string()),
            None => bail!("missing value in column '{name}' (row {row})"),
        })
        .collect()
}

/// Extracts the samples of a table. The schema is checked before any
/// row is processed and sample ids must be unique.
pub(crate) fn samples(
    df: &DataFrame,
    columns: &Columns,
) -> SignprepResult<Vec<Sample>> {
    let ids = string_column(df, &columns.id)?;
    let labels = string_column(df, &columns.label)?;
    let groups = string_column(df, &columns.group)?;

    let ids = values(ids, &columns.id)?;
    let labels = values(labels, &columns.label)?;
    let groups = values(groups, &columns.group)?;

    {
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids.iter() {
            if !seen.insert(id.as_str()) {
                return Err(SignprepError::DuplicateId(id.clone()));
            }
        }
    }

    Ok(ids
        .into_iter()
        .zip(labels)
        .zip(groups)
        .map(|((id, label), group)| Sample { id, label, group })
        .collect())
}

/// Keeps the rows with an assigned subset and appends the subset
/// column. The row order of the input is preserved.
pub(crate) fn with_subsets(
    df: &DataFrame,
    subsets: &[Option<Subset>],
    column: &str,
) -> SignprepResult<DataFrame> {
    if subsets.len() != df.height() {
        bail!(
            "expected {} subset assignments, got {}",
            df.height(),
            subsets.len()
        );
    }

    let mask: Vec<bool> = subsets.iter().map(Option::is_some).collect();
    let values: Vec<String> =
        subsets.iter().flatten().map(Subset::to_string).collect();

    let mut df = df.filter(&BooleanChunked::new("keep", mask.as_slice()))?;
    df.with_column(Series::new(column, values))?;
    Ok(df)
}

#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct GlossCount {
    #[serde(rename = "Gloss")]
    pub(crate) gloss: String,
    #[serde(rename = "Count")]
    pub(crate) count: u64,
}

/// Counts the occurrences of each gloss. The result is sorted by count
/// (descending) and gloss.
pub(crate) fn gloss_counts<'a, I>(labels: I) -> Vec<GlossCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = hashbrown::HashMap::<&str, u64>::new();
    for label in labels {
        counts
            .entry(label)
            .and_modify(|cnt| *cnt += 1)
            .or_insert(1);
    }

    let mut result: Vec<_> = counts
        .into_iter()
        .map(|(gloss, count)| GlossCount {
            gloss: gloss.to_string(),
            count,
        })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count).then(a.gloss.cmp(&b.gloss)));
    result
}

pub(crate) fn write_gloss_counts<W: Write>(
    wtr: W,
    counts: &[GlossCount],
) -> SignprepResult<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(wtr);
    for count in counts {
        writer.serialize(count)?;
    }

    writer.flush()?;
    Ok(())
}
