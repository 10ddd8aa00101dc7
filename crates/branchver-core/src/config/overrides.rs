//! Sparse configuration overrides layered over a preset

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::types::Workflow;

use super::types::GitVersionConfiguration;

const WORKFLOW_KEY: &str = "workflow";

/// Partial configuration document
///
/// Only the keys present are applied; everything else keeps the value of the
/// configuration it is applied to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    patch: Mapping,
}

impl ConfigOverrides {
    /// Empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides from a parsed document; the root must be a mapping
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Mapping(patch) => Ok(Self { patch }),
            Value::Null => Ok(Self::default()),
            other => Err(ConfigError::ParseError(format!(
                "expected a mapping at the document root, found {}",
                value_kind(&other)
            ))
            .into()),
        }
    }

    /// Overrides from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(ConfigError::YamlError)?;
        Self::from_value(value)
    }

    /// Overrides from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Value = toml::from_str(content).map_err(ConfigError::TomlError)?;
        let value = serde_yaml::to_value(table).map_err(ConfigError::YamlError)?;
        Self::from_value(value)
    }

    /// Whether nothing is overridden
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }

    /// Set a dotted key such as `branches.feature.increment`.
    ///
    /// The value is read as YAML, so `[main]`, `true` and `3` keep their types.
    pub fn set(&mut self, key_path: &str, raw_value: &str) -> Result<()> {
        let segments: Vec<&str> = key_path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: key_path.to_string(),
                message: "override keys must be dot separated names".to_string(),
            }
            .into());
        }

        let value: Value = serde_yaml::from_str(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));

        let mut nested = value;
        for segment in segments.iter().rev() {
            let mut map = Mapping::new();
            map.insert(Value::String(segment.to_string()), nested);
            nested = Value::Mapping(map);
        }

        let mut root = Value::Mapping(std::mem::take(&mut self.patch));
        deep_merge(&mut root, nested);
        if let Value::Mapping(patch) = root {
            self.patch = patch;
        }
        debug!(key = key_path, "override set");
        Ok(())
    }

    /// Layer `other` over these overrides
    pub fn merge(&mut self, other: &ConfigOverrides) {
        let mut root = Value::Mapping(std::mem::take(&mut self.patch));
        deep_merge(&mut root, Value::Mapping(other.patch.clone()));
        if let Value::Mapping(patch) = root {
            self.patch = patch;
        }
    }

    /// Workflow named by the top-level `workflow` key
    pub fn workflow(&self) -> Result<Option<Workflow>> {
        match self.patch.get(WORKFLOW_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => name
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::UnknownWorkflow(name.clone()).into()),
            Some(other) => Err(ConfigError::InvalidValue {
                field: WORKFLOW_KEY.to_string(),
                message: format!("expected a string, found {}", value_kind(other)),
            }
            .into()),
        }
    }

    /// Apply to `config`, returning the combined configuration
    pub fn apply(&self, config: &GitVersionConfiguration) -> Result<GitVersionConfiguration> {
        if self.is_empty() {
            return Ok(config.clone());
        }

        if let (Some(requested), Some(current)) = (self.workflow()?, config.workflow) {
            if requested != current {
                return Err(ConfigError::Conflict {
                    key: WORKFLOW_KEY.to_string(),
                    message: format!(
                        "overrides ask for {} but the configuration was built from {}",
                        requested, current
                    ),
                }
                .into());
            }
        }

        let mut patch = self.patch.clone();
        patch.remove(WORKFLOW_KEY);

        let mut base = serde_yaml::to_value(config).map_err(ConfigError::YamlError)?;
        deep_merge(&mut base, Value::Mapping(patch));
        let merged: GitVersionConfiguration =
            serde_yaml::from_value(base).map_err(ConfigError::YamlError)?;
        Ok(merged)
    }
}

/// Recursively merge `patch` into `base`; mappings merge, everything else replaces
fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Mapping(base_map), Value::Mapping(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, patch_value),
                    None => {
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
