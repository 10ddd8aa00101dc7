//! Configuration validation

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::GitVersionConfiguration;

/// Validate configuration
pub fn validate_config(config: &GitVersionConfiguration) -> Result<()> {
    debug!("validating configuration");
    validate_patterns(config)?;
    validate_versions(config)?;
    validate_branches(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn compile(field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

fn validate_patterns(config: &GitVersionConfiguration) -> Result<()> {
    compile("tag-prefix", &config.tag_prefix)?;
    compile("major-version-bump-message", &config.major_version_bump_message)?;
    compile("minor-version-bump-message", &config.minor_version_bump_message)?;
    compile("patch-version-bump-message", &config.patch_version_bump_message)?;
    compile("no-bump-message", &config.no_bump_message)?;

    let version_in_branch = compile("version-in-branch-pattern", &config.version_in_branch_pattern)?;
    if !version_in_branch
        .capture_names()
        .any(|name| name == Some("version"))
    {
        return Err(ConfigError::InvalidValue {
            field: "version-in-branch-pattern".to_string(),
            message: "must contain a named group 'version'".to_string(),
        }
        .into());
    }

    for (name, format) in &config.merge_message_formats {
        compile(&format!("merge-message-formats.{}", name), format)?;
    }

    Ok(())
}

fn validate_versions(config: &GitVersionConfiguration) -> Result<()> {
    let shape = compile("version", r"^[vV]?\d+(\.\d+){0,2}([-+].*)?$")?;

    if let Some(next) = &config.next_version {
        if !shape.is_match(next.trim()) {
            return Err(ConfigError::InvalidValue {
                field: "next-version".to_string(),
                message: format!("'{}' is not a version", next),
            }
            .into());
        }
    }

    if !shape.is_match(config.fallback_version.trim()) {
        return Err(ConfigError::InvalidValue {
            field: "fallback-version".to_string(),
            message: format!("'{}' is not a version", config.fallback_version),
        }
        .into());
    }

    Ok(())
}

fn validate_branches(config: &GitVersionConfiguration) -> Result<()> {
    for (key, branch) in &config.branches {
        let pattern = branch
            .regex
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField(format!("branches.{}.regex", key)))?;
        Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            branch: key.clone(),
            reason: e.to_string(),
        })?;

        if let Some(number_pattern) = &branch.label_number_pattern {
            let regex = Regex::new(number_pattern).map_err(|e| ConfigError::InvalidPattern {
                branch: key.clone(),
                reason: e.to_string(),
            })?;
            if !regex.capture_names().any(|name| name == Some("number")) {
                return Err(ConfigError::InvalidValue {
                    field: format!("branches.{}.label-number-pattern", key),
                    message: "must contain a named group 'number'".to_string(),
                }
                .into());
            }
        }

        for source in branch
            .source_branches
            .iter()
            .chain(branch.is_source_branch_for.iter())
        {
            if !config.branches.contains_key(source) {
                return Err(ConfigError::UnknownSourceBranch {
                    branch: key.clone(),
                    source_branch: source.clone(),
                }
                .into());
            }
        }

        let merged = branch.inherit(&config.branch_defaults);
        if merged.is_main_branch == Some(true) && merged.is_release_branch == Some(true) {
            return Err(ConfigError::Conflict {
                key: format!("branches.{}", key),
                message: "a branch cannot be both a main and a release branch".to_string(),
            }
            .into());
        }
    }

    Ok(())
}
