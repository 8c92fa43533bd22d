pub(crate) use clean::Clean;
pub(crate) use completions::Completions;
pub(crate) use config::Config;
pub(crate) use decode::Decode;
pub(crate) use init::Init;
pub(crate) use segments::Segments;
pub(crate) use split::Split;
pub(crate) use verify::Verify;

mod clean;
mod completions;
mod config;
mod decode;
mod init;
mod segments;
mod split;
mod verify;

use crate::config::Columns;

/// Column names of the sample table. Unset options fall back to the
/// `[columns]` section of the config.
#[derive(Debug, Default, clap::Args)]
pub(crate) struct ColumnArgs {
    /// The name of the sample id column.
    #[arg(long = "id", value_name = "column")]
    id: Option<String>,

    /// The name of the group (participant) column.
    #[arg(long = "group", value_name = "column")]
    group: Option<String>,

    /// The name of the label (gloss) column.
    #[arg(long = "label", value_name = "column")]
    label: Option<String>,

    /// The name of the subset column.
    #[arg(long = "subset", value_name = "column")]
    subset: Option<String>,
}

impl ColumnArgs {
    pub(crate) fn resolve(self, columns: &Columns) -> Columns {
        Columns {
            id: self.id.unwrap_or_else(|| columns.id.clone()),
            group: self.group.unwrap_or_else(|| columns.group.clone()),
            label: self.label.unwrap_or_else(|| columns.label.clone()),
            subset: self.subset.unwrap_or_else(|| columns.subset.clone()),
        }
    }
}
