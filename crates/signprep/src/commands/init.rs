use std::ffi::OsStr;
use std::path::PathBuf;
use std::{env, fs};

use clap::Parser;
use semver::Version;

use crate::prelude::*;

/// Initialize a new or re-initialize an existing signprep project.
#[derive(Debug, Parser)]
pub(crate) struct Init {
    /// The name of the dataset. By default the name of the project
    /// directory is used.
    #[arg(short, long)]
    name: Option<String>,

    /// The version of the dataset.
    #[arg(long, default_value = "0.1.0")]
    version: Version,

    /// A short blurb about the dataset.
    #[arg(short, long)]
    description: Option<String>,

    /// Whether to overwrite config with default values or not.
    #[arg(short, long)]
    force: bool,

    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    pub(crate) verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// The location of the project.
    #[arg(default_value = ".")]
    path: PathBuf,
}

impl Init {
    /// Initializes the project. If `config` is given, the config is
    /// written to that file instead of `<path>/signprep.toml`.
    pub(crate) fn execute(
        self,
        config: Option<&PathBuf>,
    ) -> SignprepResult<()> {
        let root_dir = env::current_dir()?.join(self.path);
        let config = match config {
            Some(path) => env::current_dir()?.join(path),
            None => root_dir.join(Config::FILENAME),
        };

        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
            log::info!("initialize new project in {}", root_dir.display());
        } else {
            log::info!(
                "re-initialize existing project in {}",
                root_dir.display()
            );
        }

        if config.exists() && !self.force {
            log::warn!(
                "{} already exists, use `--force` to overwrite it",
                config.display()
            );
            return Ok(());
        }

        let mut config = Config::create(config);
        config.metadata.description = self.description;
        config.metadata.version = self.version;
        config.metadata.name = self.name.unwrap_or(
            root_dir
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or_default()
                .to_string(),
        );

        config.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn init_with_explicit_config() -> TestResult {
        let root_dir = env::temp_dir()
            .join(format!("signprep-init-{}", std::process::id()));
        let path = root_dir.join("bsl.toml");
        let root = root_dir.to_string_lossy().to_string();

        Init::parse_from(["init", "--name", "bsl", root.as_str()])
            .execute(Some(&path))?;

        assert!(path.is_file());
        assert!(!root_dir.join(Config::FILENAME).exists());
        assert_eq!(Config::from_path(&path)?.metadata.name, "bsl");

        Init::parse_from(["init", "--name", "lse", root.as_str()])
            .execute(Some(&path))?;
        assert_eq!(Config::from_path(&path)?.metadata.name, "bsl");

        let args = ["init", "--force", "--name", "lse", root.as_str()];
        Init::parse_from(args).execute(Some(&path))?;
        assert_eq!(Config::from_path(&path)?.metadata.name, "lse");

        fs::remove_dir_all(root_dir)?;
        Ok(())
    }
}
