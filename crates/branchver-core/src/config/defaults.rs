//! Default configuration values

use crate::types::Workflow;

use super::presets::preset;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "branchver.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "branchver.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".branchver.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".branchver.toml",
    ]
}

/// Render the full preset of a workflow as YAML
pub fn default_config_yaml(workflow: Workflow) -> String {
    serde_yaml::to_string(&preset(workflow)).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Minimal configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# branchver configuration
workflow: GitFlow
tag-prefix: "[vV]?"
branches:
  feature:
    increment: Minor
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_yaml_names_workflow() {
        let yaml = default_config_yaml(Workflow::TrunkBased);
        assert!(yaml.contains("workflow: TrunkBased"));
        assert!(yaml.contains("Mainline"));
    }
}
