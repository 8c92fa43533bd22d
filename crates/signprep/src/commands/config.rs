use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::config::{
    Columns, Config as Project, Runtime, SegmentsConfig, SplitConfig,
};
use crate::prelude::*;

/// Get and set signprep config options.
#[derive(Debug, Parser)]
pub(crate) struct Config {
    /// Get the value for the given key.
    #[arg(long, conflicts_with_all = ["value", "unset", "set"])]
    get: bool,

    /// Remove the key from the config (reset it to its default).
    #[arg(long, conflicts_with_all = ["value", "get", "set"])]
    unset: bool,

    /// Set the value for the given key.
    #[arg(long, requires = "value", conflicts_with_all = ["get", "unset"])]
    set: bool,

    /// The name of the config option.
    name: String,

    /// The (new) value of the config option.
    #[arg(conflicts_with_all = ["get", "unset"])]
    value: Option<String>,
}

const OPTIONS: &[&str] = &[
    "runtime.num-jobs",
    "columns.id",
    "columns.group",
    "columns.label",
    "columns.subset",
    "split.trials",
    "split.seed",
    "split.train",
    "split.val",
    "split.test",
    "split.strict",
    "clean.uppercase",
    "clean.min-count",
    "segments.tolerance",
    "segments.threshold",
    "segments.start-value",
];

#[inline]
fn print_option<T>(key: &str, value: Option<T>)
where
    T: ToString,
{
    println!(
        "{key} = {}",
        match value {
            Some(value) => value.to_string(),
            None => "None".to_string(),
        }
    );
}

fn parse<T: FromStr>(value: &str) -> SignprepResult<T> {
    value
        .parse::<T>()
        .map_err(|_| SignprepError::other(format!("invalid value `{value}`")))
}

fn get(config: &Project, name: &str) -> Option<String> {
    let value = match name {
        "runtime.num-jobs" => {
            return config
                .runtime
                .as_ref()
                .and_then(|rt| rt.num_jobs)
                .map(|n| n.to_string());
        }
        "clean.min-count" => {
            return config.clean.min_count.map(|n| n.to_string());
        }
        "columns.id" => config.columns.id.clone(),
        "columns.group" => config.columns.group.clone(),
        "columns.label" => config.columns.label.clone(),
        "columns.subset" => config.columns.subset.clone(),
        "split.trials" => config.split.trials.to_string(),
        "split.seed" => config.split.seed.to_string(),
        "split.train" => config.split.train.to_string(),
        "split.val" => config.split.val.to_string(),
        "split.test" => config.split.test.to_string(),
        "split.strict" => config.split.strict.to_string(),
        "clean.uppercase" => config.clean.uppercase.to_string(),
        "segments.tolerance" => config.segments.tolerance.to_string(),
        "segments.threshold" => config.segments.threshold.to_string(),
        "segments.start-value" => config.segments.start_value.to_string(),
        _ => unreachable!(),
    };

    Some(value)
}

fn set(config: &mut Project, name: &str, value: &str) -> SignprepResult<()> {
    match name {
        "runtime.num-jobs" => {
            let value = parse(value)?;
            match config.runtime {
                Some(ref mut runtime) => runtime.num_jobs = Some(value),
                None => {
                    config.runtime = Some(Runtime {
                        num_jobs: Some(value),
                    })
                }
            }
        }
        "columns.id" => config.columns.id = value.into(),
        "columns.group" => config.columns.group = value.into(),
        "columns.label" => config.columns.label = value.into(),
        "columns.subset" => config.columns.subset = value.into(),
        "split.trials" => config.split.trials = parse(value)?,
        "split.seed" => config.split.seed = parse(value)?,
        "split.train" => config.split.train = parse(value)?,
        "split.val" => config.split.val = parse(value)?,
        "split.test" => config.split.test = parse(value)?,
        "split.strict" => config.split.strict = parse(value)?,
        "clean.uppercase" => config.clean.uppercase = parse(value)?,
        "clean.min-count" => config.clean.min_count = Some(parse(value)?),
        "segments.tolerance" => config.segments.tolerance = parse(value)?,
        "segments.threshold" => config.segments.threshold = parse(value)?,
        "segments.start-value" => {
            config.segments.start_value = parse(value)?
        }
        _ => unreachable!(),
    }

    Ok(())
}

fn unset(config: &mut Project, name: &str) {
    let columns = Columns::default();
    let split = SplitConfig::default();
    let segments = SegmentsConfig::default();

    match name {
        "runtime.num-jobs" => config.runtime = None,
        "columns.id" => config.columns.id = columns.id,
        "columns.group" => config.columns.group = columns.group,
        "columns.label" => config.columns.label = columns.label,
        "columns.subset" => config.columns.subset = columns.subset,
        "split.trials" => config.split.trials = split.trials,
        "split.seed" => config.split.seed = split.seed,
        "split.train" => config.split.train = split.train,
        "split.val" => config.split.val = split.val,
        "split.test" => config.split.test = split.test,
        "split.strict" => config.split.strict = split.strict,
        "clean.uppercase" => config.clean.uppercase = false,
        "clean.min-count" => config.clean.min_count = None,
        "segments.tolerance" => {
            config.segments.tolerance = segments.tolerance
        }
        "segments.threshold" => {
            config.segments.threshold = segments.threshold
        }
        "segments.start-value" => {
            config.segments.start_value = segments.start_value
        }
        _ => unreachable!(),
    }
}

impl Config {
    pub(crate) fn execute(self, path: Option<&PathBuf>) -> SignprepResult<()> {
        let mut config = match path {
            Some(path) => Project::from_path(path)?,
            None => Project::from_path(Project::discover()?)?,
        };

        let name = match self.name.as_str() {
            name if OPTIONS.contains(&name) => name,
            name => {
                bail!("unknown config option `{name}`");
            }
        };

        if let Some(ref value) = self.value {
            set(&mut config, name, value)?;
            config.save()?;
        } else if self.unset {
            unset(&mut config, name);
            config.save()?;
        } else {
            print_option(name, get(&config, name));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn set_get_unset() -> TestResult {
        let mut config = Project::default();

        for name in OPTIONS {
            assert!(
                get(&config, name).is_some()
                    || *name == "runtime.num-jobs"
                    || *name == "clean.min-count"
            );
        }

        set(&mut config, "runtime.num-jobs", "4")?;
        assert_eq!(get(&config, "runtime.num-jobs"), Some("4".into()));

        set(&mut config, "split.trials", "20")?;
        set(&mut config, "segments.start-value", "true")?;
        set(&mut config, "columns.group", "video_name")?;
        assert_eq!(config.split.trials, 20);
        assert!(config.segments.start_value);
        assert_eq!(config.columns.group, "video_name");

        unset(&mut config, "runtime.num-jobs");
        unset(&mut config, "split.trials");
        unset(&mut config, "columns.group");
        assert!(config.runtime.is_none());
        assert_eq!(config.split.trials, 1000);
        assert_eq!(config.columns.group, "Participant");
        Ok(())
    }

    #[test]
    fn execute_on_explicit_path() -> TestResult {
        let path = std::env::temp_dir().join(format!(
            "signprep-config-cmd-{}.toml",
            std::process::id()
        ));

        Project::create(&path).save()?;

        Config::parse_from(["config", "--set", "split.seed", "5"])
            .execute(Some(&path))?;
        Config::parse_from(["config", "columns.label", "gloss"])
            .execute(Some(&path))?;
        assert_eq!(Project::from_path(&path)?.split.seed, 5);
        assert_eq!(Project::from_path(&path)?.columns.label, "gloss");

        Config::parse_from(["config", "--unset", "split.seed"])
            .execute(Some(&path))?;
        assert_eq!(Project::from_path(&path)?.split.seed, 1);

        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn set_invalid_value() {
        let mut config = Project::default();
        assert!(set(&mut config, "split.trials", "many").is_err());
        assert!(set(&mut config, "split.strict", "yes").is_err());
        assert_eq!(config.split.trials, 1000);
    }
}
