use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{bail, SignprepError, SignprepResult};

/// Project config (`signprep.toml`).
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Config {
    /// The path of the config.
    #[serde(skip)]
    path: PathBuf,

    /// Project metadata.
    #[serde(default)]
    pub(crate) metadata: Metadata,

    /// Runtime options.
    pub(crate) runtime: Option<Runtime>,

    /// Names of the columns of the sample table.
    #[serde(default)]
    pub(crate) columns: Columns,

    #[serde(default)]
    pub(crate) split: SplitConfig,

    #[serde(default)]
    pub(crate) clean: CleanConfig,

    #[serde(default)]
    pub(crate) segments: SegmentsConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Metadata {
    /// The name of the dataset.
    pub(crate) name: String,

    /// The version of the dataset.
    pub(crate) version: Version,

    /// A short blurb about the dataset.
    pub(crate) description: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: "".into(),
            version: Version::new(0, 1, 0),
            description: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Runtime {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    pub(crate) num_jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Columns {
    pub(crate) id: String,
    pub(crate) group: String,
    pub(crate) label: String,
    pub(crate) subset: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: "Id".into(),
            group: "Participant".into(),
            label: "Gloss".into(),
            subset: "Subset".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub(crate) struct SplitConfig {
    /// Number of candidate splits to evaluate.
    pub(crate) trials: usize,

    /// Seed of the generator drawing the per-trial seeds.
    pub(crate) seed: u64,

    pub(crate) train: f64,
    pub(crate) val: f64,
    pub(crate) test: f64,

    /// Fail instead of dropping labels, which occur in fewer groups
    /// than there are subsets.
    pub(crate) strict: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            seed: 1,
            train: 0.6,
            val: 0.2,
            test: 0.2,
            strict: false,
        }
    }
}

impl SplitConfig {
    /// Returns the target ratios in the order train, val, test.
    pub(crate) fn ratios(&self) -> SignprepResult<[f64; 3]> {
        let ratios = [self.train, self.val, self.test];
        if ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            bail!("subset ratios must be positive (got {ratios:?})");
        }

        let sum: f64 = ratios.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            bail!("subset ratios must sum up to 1.0 (got {sum})");
        }

        Ok(ratios)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Rewrite {
    pub(crate) pattern: String,
    #[serde(default)]
    pub(crate) replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub(crate) struct CleanConfig {
    /// Convert glosses to uppercase before applying the rewrites.
    pub(crate) uppercase: bool,

    /// Ordered list of regex rewrites applied to every gloss.
    #[serde(rename = "rewrite", skip_serializing_if = "Vec::is_empty")]
    pub(crate) rewrites: Vec<Rewrite>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) drop_exact: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) drop_prefixes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) drop_suffixes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) drop_contains: Vec<String>,

    /// Groups (participants, videos) to be excluded entirely.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) drop_groups: Vec<String>,

    /// Minimum number of occurrences of a gloss.
    pub(crate) min_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub(crate) struct SegmentsConfig {
    /// Time (in seconds) a changed prediction has to persist before
    /// it's accepted.
    pub(crate) tolerance: f64,

    /// Scores above the threshold are positive predictions.
    pub(crate) threshold: f64,

    /// The stable label before the first frame.
    pub(crate) start_value: bool,
}

impl Default for SegmentsConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            threshold: 0.5,
            start_value: false,
        }
    }
}

impl Config {
    pub(crate) const FILENAME: &'static str = "signprep.toml";

    /// Creates a new default config and sets the file location.
    pub(crate) fn create<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            path: path.as_ref().into(),
            ..Default::default()
        }
    }

    /// Loads an existing config from a path.
    pub(crate) fn from_path<P>(path: P) -> SignprepResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().into();
        let content = fs::read_to_string(&path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.path = path;

        Ok(config)
    }

    /// Loads the config from `path`, if given. Otherwise the config is
    /// discovered starting at the current directory; if there is none,
    /// the default config is returned.
    pub(crate) fn load(path: Option<&PathBuf>) -> SignprepResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => match Self::discover() {
                Ok(path) => Self::from_path(path),
                Err(SignprepError::Other(_)) => {
                    log::debug!("no {} found, using defaults", Self::FILENAME);
                    Ok(Self::default())
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Searches the current directory and all parent directories for
    /// a config file.
    ///
    /// This function fails, if neither the current directory nor any
    /// parent directory contains a [Config].
    pub(crate) fn discover() -> SignprepResult<PathBuf> {
        let mut root_dir = std::env::current_dir()?;

        loop {
            let candidate = root_dir.join(Self::FILENAME);
            if candidate.is_file() {
                return Ok(candidate);
            }

            if !root_dir.pop() {
                bail!("not a signprep project (or any parent directory)");
            }
        }
    }

    /// Saves the config.
    pub(crate) fn save(&self) -> SignprepResult<()> {
        let content = toml::to_string(self)?;
        let mut out = File::create(&self.path)?;
        out.write_all(content.as_bytes())?;
        Ok(())
    }
}
