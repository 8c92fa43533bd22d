use std::fmt::{self, Display};
use std::str::FromStr;

use crate::prelude::*;

/// A single labeled sample of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sample {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) group: String,
}

impl Sample {
    pub(crate) fn new<S: Into<String>>(id: S, label: S, group: S) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group: group.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Subset {
    Train,
    Val,
    Test,
}

impl Subset {
    pub(crate) const ALL: [Subset; 3] =
        [Subset::Train, Subset::Val, Subset::Test];

    /// Position of the subset in [Subset::ALL].
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Train => 0,
            Self::Val => 1,
            Self::Test => 2,
        }
    }
}

impl Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Val => write!(f, "val"),
            Self::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Subset {
    type Err = SignprepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "val" => Ok(Self::Val),
            "test" => Ok(Self::Test),
            _ => bail!("invalid subset '{s}'"),
        }
    }
}
