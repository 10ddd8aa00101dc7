//! Concrete settings for one branch

use serde::Serialize;

use crate::types::{
    AssemblyVersioningScheme, CommitMessageIncrementMode, DeploymentMode, IncrementStrategy,
    SemanticVersionFormat, VersionStrategyKind,
};

use super::types::{BranchConfiguration, GitVersionConfiguration, BRANCH_NAME_PLACEHOLDER};

/// Fully resolved configuration for a branch
///
/// Built by flattening the global settings and the branch's settings merged
/// over the defaults. `increment` is never `Inherit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveConfiguration {
    pub branch_key: Option<String>,
    pub branch_regex: Option<String>,
    pub increment: IncrementStrategy,
    pub label: String,
    pub label_number_pattern: Option<String>,
    pub source_branches: Vec<String>,
    pub prevent_increment_of_merged_branch: bool,
    pub prevent_increment_when_branch_merged: bool,
    pub prevent_increment_when_current_commit_tagged: bool,
    pub track_merge_target: bool,
    pub track_merge_message: bool,
    pub tracks_release_branches: bool,
    pub is_release_branch: bool,
    pub is_main_branch: bool,
    pub pre_release_weight: u64,
    pub deployment_mode: DeploymentMode,
    pub commit_message_incrementing: CommitMessageIncrementMode,

    pub tag_prefix: String,
    pub version_in_branch_pattern: String,
    pub next_version: Option<String>,
    pub major_version_bump_message: String,
    pub minor_version_bump_message: String,
    pub patch_version_bump_message: String,
    pub no_bump_message: String,
    pub semantic_version_format: SemanticVersionFormat,
    pub tag_pre_release_weight: u64,
    pub continuous_delivery_fallback_label: String,
    pub build_metadata_padding: usize,
    pub commits_since_version_source_padding: usize,
    pub legacy_semver_padding: usize,
    pub commit_date_format: String,
    pub assembly_versioning_scheme: AssemblyVersioningScheme,
    pub assembly_file_versioning_scheme: AssemblyVersioningScheme,
    pub mainline: bool,
}

impl EffectiveConfiguration {
    /// Flatten `branch` (already merged over the defaults) with the globals.
    ///
    /// `increment` replaces the branch's own increment and must be concrete.
    pub fn new(
        config: &GitVersionConfiguration,
        branch_key: Option<&str>,
        branch: &BranchConfiguration,
        increment: IncrementStrategy,
    ) -> Self {
        let prevent = &branch.prevent_increment;
        Self {
            branch_key: branch_key.map(str::to_string),
            branch_regex: branch.regex.clone(),
            increment,
            label: branch
                .label
                .clone()
                .unwrap_or_else(|| BRANCH_NAME_PLACEHOLDER.to_string()),
            label_number_pattern: branch.label_number_pattern.clone(),
            source_branches: branch.source_branches.clone(),
            prevent_increment_of_merged_branch: prevent.of_merged_branch.unwrap_or(false),
            prevent_increment_when_branch_merged: prevent.when_branch_merged.unwrap_or(false),
            prevent_increment_when_current_commit_tagged: prevent
                .when_current_commit_tagged
                .unwrap_or(true),
            track_merge_target: branch.track_merge_target.unwrap_or(false),
            track_merge_message: branch.track_merge_message.unwrap_or(true),
            tracks_release_branches: branch.tracks_release_branches.unwrap_or(false),
            is_release_branch: branch.is_release_branch.unwrap_or(false),
            is_main_branch: branch.is_main_branch.unwrap_or(false),
            pre_release_weight: branch.pre_release_weight.unwrap_or(0),
            deployment_mode: branch
                .deployment_mode
                .unwrap_or(DeploymentMode::ContinuousDelivery),
            commit_message_incrementing: branch
                .commit_message_incrementing
                .unwrap_or(CommitMessageIncrementMode::Enabled),

            tag_prefix: config.tag_prefix.clone(),
            version_in_branch_pattern: config.version_in_branch_pattern.clone(),
            next_version: config.next_version.clone(),
            major_version_bump_message: config.major_version_bump_message.clone(),
            minor_version_bump_message: config.minor_version_bump_message.clone(),
            patch_version_bump_message: config.patch_version_bump_message.clone(),
            no_bump_message: config.no_bump_message.clone(),
            semantic_version_format: config.semantic_version_format,
            tag_pre_release_weight: config.tag_pre_release_weight,
            continuous_delivery_fallback_label: config.continuous_delivery_fallback_label.clone(),
            build_metadata_padding: config.build_metadata_padding,
            commits_since_version_source_padding: config.commits_since_version_source_padding,
            legacy_semver_padding: config.legacy_semver_padding,
            commit_date_format: config.commit_date_format.clone(),
            assembly_versioning_scheme: config.assembly_versioning_scheme,
            assembly_file_versioning_scheme: config.assembly_file_versioning_scheme,
            mainline: config.is_strategy_enabled(VersionStrategyKind::Mainline),
        }
    }

    /// Whether commit counts become the pre-release number
    pub fn is_continuous_deployment(&self) -> bool {
        self.deployment_mode == DeploymentMode::ContinuousDeployment
    }
}
