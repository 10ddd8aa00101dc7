//! Preset plus overrides, validated

use tracing::debug;

use crate::error::Result;
use crate::types::Workflow;

use super::overrides::ConfigOverrides;
use super::presets::preset;
use super::types::GitVersionConfiguration;
use super::validation::validate_config;

/// Builds a configuration from a workflow preset and layered overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    workflow: Workflow,
    overrides: Vec<ConfigOverrides>,
}

impl ConfigurationBuilder {
    /// Start from the preset of `workflow`
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            overrides: Vec::new(),
        }
    }

    /// Add an override layer; later layers win
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides.push(overrides);
        self
    }

    /// Apply every layer and validate the result
    pub fn build(self) -> Result<GitVersionConfiguration> {
        let mut config = preset(self.workflow);
        for layer in &self.overrides {
            config = layer.apply(&config)?;
        }
        validate_config(&config)?;
        debug!(
            workflow = %self.workflow,
            layers = self.overrides.len(),
            branches = config.branches.len(),
            "configuration built"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IncrementStrategy;

    #[test]
    fn test_later_layers_win() {
        let mut first = ConfigOverrides::new();
        first.set("branches.develop.increment", "Major").unwrap();
        let mut second = ConfigOverrides::new();
        second.set("branches.develop.increment", "Patch").unwrap();

        let config = ConfigurationBuilder::new(Workflow::GitFlow)
            .with_overrides(first)
            .with_overrides(second)
            .build()
            .unwrap();
        assert_eq!(
            config.branches["develop"].increment,
            Some(IncrementStrategy::Patch)
        );
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut overrides = ConfigOverrides::new();
        overrides
            .set("branches.feature.source-branches", "[nowhere]")
            .unwrap();

        let result = ConfigurationBuilder::new(Workflow::GitHubFlow)
            .with_overrides(overrides)
            .build();
        assert!(result.is_err());
    }
}
