//! Configuration types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    AssemblyVersioningScheme, CommitMessageIncrementMode, DeploymentMode, IncrementStrategy,
    SemanticVersionFormat, VersionStrategyKind, Workflow,
};

/// Key of the catch-all branch configuration, matched after every other key
pub const UNKNOWN_BRANCH_KEY: &str = "unknown";

/// Placeholder replaced with the branch name in labels
pub const BRANCH_NAME_PLACEHOLDER: &str = "{BranchName}";

/// Full configuration handed to the version calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitVersionConfiguration {
    /// Preset this configuration was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,

    /// Regex stripped from the front of tag names
    pub tag_prefix: String,

    /// Regex with a `version` group used to find versions in branch names
    pub version_in_branch_pattern: String,

    /// Explicit next version
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "version_string"
    )]
    pub next_version: Option<String>,

    /// Version proposed when nothing else applies
    pub fallback_version: String,

    /// Whether the fallback version receives the branch increment
    pub fallback_should_increment: bool,

    /// Commit message regex forcing a major bump
    pub major_version_bump_message: String,

    /// Commit message regex forcing a minor bump
    pub minor_version_bump_message: String,

    /// Commit message regex forcing a patch bump
    pub patch_version_bump_message: String,

    /// Commit message regex suppressing the bump
    pub no_bump_message: String,

    /// Strictness of version parsing
    pub semantic_version_format: SemanticVersionFormat,

    /// Weight used when a version has no pre-release tag
    pub tag_pre_release_weight: u64,

    /// Label used in continuous deployment when a branch has none
    pub continuous_delivery_fallback_label: String,

    /// Zero padding for label numbers and padded build metadata
    pub build_metadata_padding: usize,

    /// Zero padding for the padded commit count
    pub commits_since_version_source_padding: usize,

    /// Zero padding for the legacy pre-release number
    pub legacy_semver_padding: usize,

    /// strftime format of the commit date variable
    pub commit_date_format: String,

    /// Scheme for AssemblySemVer
    pub assembly_versioning_scheme: AssemblyVersioningScheme,

    /// Scheme for AssemblySemFileVer
    pub assembly_file_versioning_scheme: AssemblyVersioningScheme,

    /// Extra merge message formats, tried before the built-in ones
    pub merge_message_formats: BTreeMap<String, String>,

    /// Enabled base version strategies; fallback is always enabled
    pub strategies: Vec<VersionStrategyKind>,

    /// Candidate exclusions
    pub ignore: IgnoreConfiguration,

    /// Settings inherited by every branch
    #[serde(flatten)]
    pub branch_defaults: BranchConfiguration,

    /// Per-branch settings keyed by branch kind
    pub branches: BTreeMap<String, BranchConfiguration>,
}

impl Default for GitVersionConfiguration {
    fn default() -> Self {
        Self {
            workflow: None,
            tag_prefix: "[vV]?".to_string(),
            version_in_branch_pattern: r"(?P<version>[vV]?\d+(\.\d+)?(\.\d+)?).*".to_string(),
            next_version: None,
            fallback_version: "0.1.0".to_string(),
            fallback_should_increment: false,
            major_version_bump_message: r"\+semver:\s?(breaking|major)".to_string(),
            minor_version_bump_message: r"\+semver:\s?(feature|minor)".to_string(),
            patch_version_bump_message: r"\+semver:\s?(fix|patch)".to_string(),
            no_bump_message: r"\+semver:\s?(none|skip)".to_string(),
            semantic_version_format: SemanticVersionFormat::Strict,
            tag_pre_release_weight: 60000,
            continuous_delivery_fallback_label: "ci".to_string(),
            build_metadata_padding: 4,
            commits_since_version_source_padding: 4,
            legacy_semver_padding: 4,
            commit_date_format: "%Y-%m-%d".to_string(),
            assembly_versioning_scheme: AssemblyVersioningScheme::MajorMinorPatch,
            assembly_file_versioning_scheme: AssemblyVersioningScheme::MajorMinorPatch,
            merge_message_formats: BTreeMap::new(),
            strategies: vec![
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::TaggedCommit,
                VersionStrategyKind::MergeMessage,
                VersionStrategyKind::VersionInBranchName,
                VersionStrategyKind::TrackMergeTarget,
                VersionStrategyKind::TrackReleaseBranches,
            ],
            ignore: IgnoreConfiguration::default(),
            branch_defaults: BranchConfiguration::root_defaults(IncrementStrategy::Patch),
            branches: BTreeMap::new(),
        }
    }
}

impl GitVersionConfiguration {
    /// Key of the first branch configuration whose regex matches `branch_name`.
    ///
    /// Keys are tried in order with `unknown` last. Invalid regexes never match;
    /// validation reports them.
    pub fn find_branch_key(&self, branch_name: &str) -> Option<&str> {
        let known = self
            .branches
            .iter()
            .filter(|(key, _)| key.as_str() != UNKNOWN_BRANCH_KEY);
        let unknown = self
            .branches
            .iter()
            .filter(|(key, _)| key.as_str() == UNKNOWN_BRANCH_KEY);

        known
            .chain(unknown)
            .find(|(_, config)| config.matches(branch_name))
            .map(|(key, _)| key.as_str())
    }

    /// Branch configuration for `branch_name` merged over the defaults
    pub fn branch_configuration_for(&self, branch_name: &str) -> BranchConfiguration {
        match self.find_branch_key(branch_name) {
            Some(key) => self.branches[key].inherit(&self.branch_defaults),
            None => self.branch_defaults.clone(),
        }
    }

    /// Whether `branch_name` is configured as a release branch
    pub fn is_release_branch(&self, branch_name: &str) -> bool {
        self.branch_configuration_for(branch_name)
            .is_release_branch
            .unwrap_or(false)
    }

    /// Whether `branch_name` is configured as a main branch
    pub fn is_main_branch(&self, branch_name: &str) -> bool {
        self.branch_configuration_for(branch_name)
            .is_main_branch
            .unwrap_or(false)
    }

    /// Whether a strategy is switched on
    pub fn is_strategy_enabled(&self, kind: VersionStrategyKind) -> bool {
        kind == VersionStrategyKind::Fallback || self.strategies.contains(&kind)
    }
}

/// Accept `next-version: 2.0` as well as the quoted form
fn version_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(version)) => Ok(Some(version)),
        Some(serde_yaml::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(D::Error::custom("next-version must be a string or a number")),
    }
}

/// Exclusions applied to base version candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IgnoreConfiguration {
    /// Candidates sourced before this instant are dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits_before: Option<DateTime<Utc>>,

    /// Candidates sourced at commits starting with one of these shas are dropped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shas: Vec<String>,

    /// Candidates whose source commit touches one of these globs are dropped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

impl IgnoreConfiguration {
    /// Whether no exclusion is configured
    pub fn is_empty(&self) -> bool {
        self.commits_before.is_none() && self.shas.is_empty() && self.paths.is_empty()
    }
}

/// Settings that stop a bump from happening
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PreventIncrementConfiguration {
    /// Versions carried in by merged release branches are not bumped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of_merged_branch: Option<bool>,

    /// Versions carried in by merge targets are not bumped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_branch_merged: Option<bool>,

    /// A tagged current commit takes the tag verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_current_commit_tagged: Option<bool>,
}

impl PreventIncrementConfiguration {
    /// Whether every field is unset
    pub fn is_empty(&self) -> bool {
        self.of_merged_branch.is_none()
            && self.when_branch_merged.is_none()
            && self.when_current_commit_tagged.is_none()
    }

    fn inherit(&self, parent: &Self) -> Self {
        Self {
            of_merged_branch: self.of_merged_branch.or(parent.of_merged_branch),
            when_branch_merged: self.when_branch_merged.or(parent.when_branch_merged),
            when_current_commit_tagged: self
                .when_current_commit_tagged
                .or(parent.when_current_commit_tagged),
        }
    }
}

/// Sparse per-branch settings
///
/// Every field is optional so presets, overrides and the defaults can be
/// layered with [`BranchConfiguration::inherit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BranchConfiguration {
    /// Regex over the branch name; named groups feed label placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Increment applied on this branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<IncrementStrategy>,

    /// Pre-release label; `{BranchName}` and regex group placeholders are expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Regex with a `number` group appended to the label (e.g. pull request number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_number_pattern: Option<String>,

    /// Branch keys this branch is created from
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_branches: Vec<String>,

    /// Branch keys created from this branch
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub is_source_branch_for: Vec<String>,

    /// Bump suppression
    #[serde(skip_serializing_if = "PreventIncrementConfiguration::is_empty")]
    pub prevent_increment: PreventIncrementConfiguration,

    /// Use tags of branches merged into this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_merge_target: Option<bool>,

    /// Use versions named in merge messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_merge_message: Option<bool>,

    /// Follow live release branches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks_release_branches: Option<bool>,

    /// Branch names carry the version being released
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_release_branch: Option<bool>,

    /// Long-lived trunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main_branch: Option<bool>,

    /// Added to the pre-release number for the weighted number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_release_weight: Option<u64>,

    /// Shipping mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_mode: Option<DeploymentMode>,

    /// Which commits are scanned for bump directives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
}

impl BranchConfiguration {
    /// Fully populated defaults every preset starts from
    pub fn root_defaults(increment: IncrementStrategy) -> Self {
        Self {
            regex: None,
            increment: Some(increment),
            label: Some(BRANCH_NAME_PLACEHOLDER.to_string()),
            label_number_pattern: None,
            source_branches: Vec::new(),
            is_source_branch_for: Vec::new(),
            prevent_increment: PreventIncrementConfiguration {
                of_merged_branch: Some(false),
                when_branch_merged: Some(false),
                when_current_commit_tagged: Some(true),
            },
            track_merge_target: Some(false),
            track_merge_message: Some(true),
            tracks_release_branches: Some(false),
            is_release_branch: Some(false),
            is_main_branch: Some(false),
            pre_release_weight: Some(0),
            deployment_mode: Some(DeploymentMode::ContinuousDelivery),
            commit_message_incrementing: Some(CommitMessageIncrementMode::Enabled),
        }
    }

    /// Layer `self` over `parent`: fields set here win
    pub fn inherit(&self, parent: &BranchConfiguration) -> BranchConfiguration {
        BranchConfiguration {
            regex: self.regex.clone().or_else(|| parent.regex.clone()),
            increment: self.increment.or(parent.increment),
            label: self.label.clone().or_else(|| parent.label.clone()),
            label_number_pattern: self
                .label_number_pattern
                .clone()
                .or_else(|| parent.label_number_pattern.clone()),
            source_branches: if self.source_branches.is_empty() {
                parent.source_branches.clone()
            } else {
                self.source_branches.clone()
            },
            is_source_branch_for: if self.is_source_branch_for.is_empty() {
                parent.is_source_branch_for.clone()
            } else {
                self.is_source_branch_for.clone()
            },
            prevent_increment: self.prevent_increment.inherit(&parent.prevent_increment),
            track_merge_target: self.track_merge_target.or(parent.track_merge_target),
            track_merge_message: self.track_merge_message.or(parent.track_merge_message),
            tracks_release_branches: self
                .tracks_release_branches
                .or(parent.tracks_release_branches),
            is_release_branch: self.is_release_branch.or(parent.is_release_branch),
            is_main_branch: self.is_main_branch.or(parent.is_main_branch),
            pre_release_weight: self.pre_release_weight.or(parent.pre_release_weight),
            deployment_mode: self.deployment_mode.or(parent.deployment_mode),
            commit_message_incrementing: self
                .commit_message_incrementing
                .or(parent.commit_message_incrementing),
        }
    }

    /// Whether the branch regex matches `branch_name`
    pub fn matches(&self, branch_name: &str) -> bool {
        self.regex
            .as_deref()
            .and_then(|pattern| Regex::new(pattern).ok())
            .is_some_and(|regex| regex.is_match(branch_name))
    }

    /// Increment, treating unset as inherit
    pub fn increment_or_inherit(&self) -> IncrementStrategy {
        self.increment.unwrap_or(IncrementStrategy::Inherit)
    }
}
