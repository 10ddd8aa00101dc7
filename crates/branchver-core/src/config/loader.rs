//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::types::Workflow;

use super::builder::ConfigurationBuilder;
use super::defaults::config_file_names;
use super::overrides::ConfigOverrides;
use super::types::GitVersionConfiguration;

/// Read a configuration file as overrides without applying them
pub fn read_overrides(path: &Path) -> Result<ConfigOverrides> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    if path.extension().is_some_and(|e| e == "toml") {
        ConfigOverrides::from_toml_str(&content)
    } else {
        ConfigOverrides::from_yaml_str(&content)
    }
}

/// Load configuration from a file.
///
/// The file's `workflow` key picks the preset unless `workflow` is given;
/// the rest of the file is layered over it, then `extra` on top.
pub fn load_config(
    path: &Path,
    workflow: Option<Workflow>,
    extra: Option<ConfigOverrides>,
) -> Result<GitVersionConfiguration> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let mut file_overrides = read_overrides(path)?;
    let workflow = match workflow {
        Some(workflow) => workflow,
        None => file_overrides.workflow()?.unwrap_or_default(),
    };
    if let Some(extra) = &extra {
        file_overrides.merge(extra);
    }

    let config = ConfigurationBuilder::new(workflow)
        .with_overrides(file_overrides)
        .build()?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Nearest configuration file at or above `start_dir`.
///
/// Each directory is checked for every known file name, first directly and
/// then under `.github/`, before moving to its parent.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir
        .ancestors()
        .flat_map(|dir| {
            config_file_names()
                .into_iter()
                .flat_map(move |name| [dir.join(name), dir.join(".github").join(name)])
        })
        .find(|candidate| candidate.is_file());

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!(start_dir = %start_dir.display(), "no config file found"),
    }
    found
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(
    dir: &Path,
    workflow: Option<Workflow>,
    extra: Option<ConfigOverrides>,
) -> Result<(GitVersionConfiguration, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path, workflow, extra)?;
    Ok((config, config_path))
}

/// Load configuration, or build the preset when no file exists.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(
    dir: &Path,
    workflow: Option<Workflow>,
    extra: Option<ConfigOverrides>,
) -> Result<(GitVersionConfiguration, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path, workflow, extra)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(dir = %dir.display(), "no config found, using workflow preset");
            let mut builder = ConfigurationBuilder::new(workflow.unwrap_or_default());
            if let Some(extra) = extra {
                builder = builder.with_overrides(extra);
            }
            Ok((builder.build()?, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IncrementStrategy, VersionStrategyKind};
    use tempfile::TempDir;

    #[test]
    fn test_find_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("branchver.yaml");
        std::fs::write(&config_path, "workflow: GitFlow\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("branchver.toml");
        std::fs::write(&config_path, "workflow = \"GitHubFlow\"\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".branchver.yaml");
        std::fs::write(&config_path, "tag-prefix: v\n").unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_yaml_picks_workflow() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("branchver.yaml");
        std::fs::write(
            &config_path,
            "workflow: TrunkBased\nbranches:\n  feature:\n    increment: Patch\n",
        )
        .unwrap();

        let config = load_config(&config_path, None, None).unwrap();
        assert_eq!(config.workflow, Some(Workflow::TrunkBased));
        assert!(config.is_strategy_enabled(VersionStrategyKind::Mainline));
        assert_eq!(
            config.branches["feature"].increment,
            Some(IncrementStrategy::Patch)
        );
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("branchver.toml");
        std::fs::write(&config_path, "next-version = \"3.0.0\"\n").unwrap();

        let config = load_config(&config_path, None, None).unwrap();
        assert_eq!(config.workflow, Some(Workflow::GitFlow));
        assert_eq!(config.next_version.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_extra_overrides_win_over_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("branchver.yaml");
        std::fs::write(&config_path, "next-version: 3.0.0\n").unwrap();

        let mut extra = ConfigOverrides::new();
        extra.set("next-version", "4.0.0").unwrap();
        let config = load_config(&config_path, None, Some(extra)).unwrap();
        assert_eq!(config.next_version.as_deref(), Some("4.0.0"));
    }

    #[test]
    fn test_missing_file_uses_preset() {
        let temp = TempDir::new().unwrap();
        let (config, path) =
            load_config_or_default(temp.path(), Some(Workflow::GitHubFlow), None).unwrap();
        assert!(path.is_none() || !path.unwrap().starts_with(temp.path()));
        assert_eq!(config.workflow, Some(Workflow::GitHubFlow));
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("branchver.yaml"), "branches: [").unwrap();
        assert!(load_config_or_default(temp.path(), None, None).is_err());
    }
}
