//! Configuration flags shared by commands

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use branchver_core::config::{load_config, load_config_or_default};
use branchver_core::error::Result;
use branchver_core::{ConfigError, ConfigOverrides, GitVersionConfiguration, Workflow};

/// Where the configuration comes from
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file; searched from the working directory when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preset to start from (GitFlow, GitHubFlow, TrunkBased)
    #[arg(long)]
    pub workflow: Option<Workflow>,

    /// Override a configuration key, e.g. `branches.main.increment=Minor`
    #[arg(long = "override", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl ConfigArgs {
    /// Build the configuration, returning the file it was read from
    pub fn load(&self, dir: &Path) -> Result<(GitVersionConfiguration, Option<PathBuf>)> {
        let extra = self.parse_overrides()?;
        match &self.config {
            Some(path) => Ok((load_config(path, self.workflow, extra)?, Some(path.clone()))),
            None => load_config_or_default(dir, self.workflow, extra),
        }
    }

    fn parse_overrides(&self) -> Result<Option<ConfigOverrides>> {
        if self.overrides.is_empty() {
            return Ok(None);
        }

        let mut overrides = ConfigOverrides::new();
        for pair in &self.overrides {
            let (key, value) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                field: pair.clone(),
                message: "expected KEY=VALUE".to_string(),
            })?;
            debug!(key, "command line override");
            overrides.set(key.trim(), value.trim())?;
        }
        Ok(Some(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preset_when_no_file() {
        let temp = TempDir::new().unwrap();
        let args = ConfigArgs {
            workflow: Some(Workflow::TrunkBased),
            ..Default::default()
        };

        let (config, path) = args.load(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.workflow, Some(Workflow::TrunkBased));
    }

    #[test]
    fn test_file_and_overrides() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("branchver.yaml"),
            "workflow: GitHubFlow\ntag-prefix: '[vV]?'\n",
        )
        .unwrap();
        let args = ConfigArgs {
            overrides: vec!["tag-prefix=release-".to_string()],
            ..Default::default()
        };

        let (config, path) = args.load(temp.path()).unwrap();
        assert_eq!(path, Some(temp.path().join("branchver.yaml")));
        assert_eq!(config.workflow, Some(Workflow::GitHubFlow));
        assert_eq!(config.tag_prefix, "release-");
    }

    #[test]
    fn test_malformed_override() {
        let temp = TempDir::new().unwrap();
        let args = ConfigArgs {
            overrides: vec!["tag-prefix".to_string()],
            ..Default::default()
        };

        let err = args.load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }
}
