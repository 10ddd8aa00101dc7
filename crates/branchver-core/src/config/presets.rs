//! Workflow presets

use std::collections::BTreeMap;

use crate::types::{
    CommitMessageIncrementMode, DeploymentMode, IncrementStrategy, VersionStrategyKind, Workflow,
};

use super::types::{
    BranchConfiguration, GitVersionConfiguration, PreventIncrementConfiguration,
    UNKNOWN_BRANCH_KEY,
};

pub const MAIN_BRANCH_KEY: &str = "main";
pub const DEVELOP_BRANCH_KEY: &str = "develop";
pub const RELEASE_BRANCH_KEY: &str = "release";
pub const FEATURE_BRANCH_KEY: &str = "feature";
pub const PULL_REQUEST_BRANCH_KEY: &str = "pull-request";
pub const HOTFIX_BRANCH_KEY: &str = "hotfix";
pub const SUPPORT_BRANCH_KEY: &str = "support";

const MAIN_REGEX: &str = "^master$|^main$";
const DEVELOP_REGEX: &str = "^dev(elop)?(ment)?$";
const RELEASE_REGEX: &str = "^releases?[/-](?P<BranchName>.+)";
const FEATURE_REGEX: &str = "^features?[/-](?P<BranchName>.+)";
const PULL_REQUEST_REGEX: &str = r"^(pull-requests|pull|pr)[/-]";
const HOTFIX_REGEX: &str = "^hotfix(es)?[/-](?P<BranchName>.+)";
const SUPPORT_REGEX: &str = "^support[/-](?P<BranchName>.+)";
const UNKNOWN_REGEX: &str = "(?P<BranchName>.+)";
const PULL_REQUEST_NUMBER_PATTERN: &str = r"[/-](?P<number>\d+)";

/// Build the preset configuration for a workflow
pub fn preset(workflow: Workflow) -> GitVersionConfiguration {
    match workflow {
        Workflow::GitFlow => git_flow(),
        Workflow::GitHubFlow => github_flow(),
        Workflow::TrunkBased => trunk_based(),
    }
}

fn base(workflow: Workflow) -> GitVersionConfiguration {
    GitVersionConfiguration {
        workflow: Some(workflow),
        fallback_version: "0.0.0".to_string(),
        fallback_should_increment: true,
        branch_defaults: BranchConfiguration::root_defaults(IncrementStrategy::Inherit),
        ..Default::default()
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn prevent(
    of_merged_branch: Option<bool>,
    when_branch_merged: Option<bool>,
    when_current_commit_tagged: Option<bool>,
) -> PreventIncrementConfiguration {
    PreventIncrementConfiguration {
        of_merged_branch,
        when_branch_merged,
        when_current_commit_tagged,
    }
}

fn main_branch(source_branches: Vec<String>, mode: DeploymentMode) -> BranchConfiguration {
    BranchConfiguration {
        regex: Some(MAIN_REGEX.to_string()),
        increment: Some(IncrementStrategy::Patch),
        label: Some(String::new()),
        source_branches,
        prevent_increment: prevent(Some(true), None, None),
        track_merge_target: Some(false),
        tracks_release_branches: Some(false),
        is_release_branch: Some(false),
        is_main_branch: Some(true),
        pre_release_weight: Some(55000),
        deployment_mode: Some(mode),
        ..Default::default()
    }
}

fn release_branch(source_branches: Vec<String>) -> BranchConfiguration {
    BranchConfiguration {
        regex: Some(RELEASE_REGEX.to_string()),
        increment: Some(IncrementStrategy::Minor),
        label: Some("beta".to_string()),
        source_branches,
        prevent_increment: prevent(Some(true), Some(false), Some(false)),
        deployment_mode: Some(DeploymentMode::ManualDeployment),
        track_merge_target: Some(false),
        tracks_release_branches: Some(false),
        is_release_branch: Some(true),
        is_main_branch: Some(false),
        pre_release_weight: Some(30000),
        ..Default::default()
    }
}

fn feature_branch(
    increment: IncrementStrategy,
    source_branches: Vec<String>,
    mode: DeploymentMode,
) -> BranchConfiguration {
    BranchConfiguration {
        regex: Some(FEATURE_REGEX.to_string()),
        increment: Some(increment),
        label: Some(super::types::BRANCH_NAME_PLACEHOLDER.to_string()),
        source_branches,
        prevent_increment: prevent(None, None, Some(false)),
        deployment_mode: Some(mode),
        is_release_branch: Some(false),
        is_main_branch: Some(false),
        pre_release_weight: Some(30000),
        ..Default::default()
    }
}

fn pull_request_branch(source_branches: Vec<String>) -> BranchConfiguration {
    BranchConfiguration {
        regex: Some(PULL_REQUEST_REGEX.to_string()),
        increment: Some(IncrementStrategy::Inherit),
        label: Some("PullRequest".to_string()),
        label_number_pattern: Some(PULL_REQUEST_NUMBER_PATTERN.to_string()),
        source_branches,
        prevent_increment: prevent(Some(true), None, Some(false)),
        deployment_mode: Some(DeploymentMode::ContinuousDelivery),
        is_release_branch: Some(false),
        is_main_branch: Some(false),
        pre_release_weight: Some(30000),
        ..Default::default()
    }
}

fn unknown_branch(source_branches: Vec<String>) -> BranchConfiguration {
    BranchConfiguration {
        regex: Some(UNKNOWN_REGEX.to_string()),
        increment: Some(IncrementStrategy::Inherit),
        label: Some(super::types::BRANCH_NAME_PLACEHOLDER.to_string()),
        source_branches,
        prevent_increment: prevent(None, None, Some(false)),
        deployment_mode: Some(DeploymentMode::ManualDeployment),
        is_release_branch: Some(false),
        is_main_branch: Some(false),
        pre_release_weight: Some(30000),
        ..Default::default()
    }
}

/// GitFlow: main, develop, release, feature, pull-request, hotfix, support
pub fn git_flow() -> GitVersionConfiguration {
    let mut config = base(Workflow::GitFlow);
    let mut branches = BTreeMap::new();

    branches.insert(
        DEVELOP_BRANCH_KEY.to_string(),
        BranchConfiguration {
            regex: Some(DEVELOP_REGEX.to_string()),
            increment: Some(IncrementStrategy::Minor),
            label: Some("alpha".to_string()),
            source_branches: keys(&[MAIN_BRANCH_KEY]),
            prevent_increment: prevent(None, None, Some(false)),
            track_merge_target: Some(true),
            tracks_release_branches: Some(true),
            is_release_branch: Some(false),
            is_main_branch: Some(false),
            pre_release_weight: Some(0),
            deployment_mode: Some(DeploymentMode::ContinuousDelivery),
            ..Default::default()
        },
    );
    branches.insert(
        MAIN_BRANCH_KEY.to_string(),
        main_branch(Vec::new(), DeploymentMode::ContinuousDelivery),
    );
    branches.insert(
        RELEASE_BRANCH_KEY.to_string(),
        release_branch(keys(&[
            DEVELOP_BRANCH_KEY,
            MAIN_BRANCH_KEY,
            SUPPORT_BRANCH_KEY,
            RELEASE_BRANCH_KEY,
        ])),
    );
    branches.insert(
        FEATURE_BRANCH_KEY.to_string(),
        feature_branch(
            IncrementStrategy::Inherit,
            keys(&[
                DEVELOP_BRANCH_KEY,
                MAIN_BRANCH_KEY,
                RELEASE_BRANCH_KEY,
                FEATURE_BRANCH_KEY,
                SUPPORT_BRANCH_KEY,
                HOTFIX_BRANCH_KEY,
            ]),
            DeploymentMode::ManualDeployment,
        ),
    );
    branches.insert(
        PULL_REQUEST_BRANCH_KEY.to_string(),
        pull_request_branch(keys(&[
            DEVELOP_BRANCH_KEY,
            MAIN_BRANCH_KEY,
            RELEASE_BRANCH_KEY,
            FEATURE_BRANCH_KEY,
            SUPPORT_BRANCH_KEY,
            HOTFIX_BRANCH_KEY,
        ])),
    );
    branches.insert(
        HOTFIX_BRANCH_KEY.to_string(),
        BranchConfiguration {
            regex: Some(HOTFIX_REGEX.to_string()),
            increment: Some(IncrementStrategy::Inherit),
            label: Some("beta".to_string()),
            source_branches: keys(&[MAIN_BRANCH_KEY, SUPPORT_BRANCH_KEY]),
            prevent_increment: prevent(None, None, Some(false)),
            deployment_mode: Some(DeploymentMode::ManualDeployment),
            is_release_branch: Some(true),
            is_main_branch: Some(false),
            pre_release_weight: Some(30000),
            ..Default::default()
        },
    );
    branches.insert(
        SUPPORT_BRANCH_KEY.to_string(),
        BranchConfiguration {
            regex: Some(SUPPORT_REGEX.to_string()),
            increment: Some(IncrementStrategy::Patch),
            label: Some(String::new()),
            source_branches: keys(&[MAIN_BRANCH_KEY]),
            prevent_increment: prevent(Some(true), None, None),
            track_merge_target: Some(false),
            tracks_release_branches: Some(false),
            is_release_branch: Some(false),
            is_main_branch: Some(true),
            pre_release_weight: Some(55000),
            ..Default::default()
        },
    );
    branches.insert(
        UNKNOWN_BRANCH_KEY.to_string(),
        unknown_branch(keys(&[
            MAIN_BRANCH_KEY,
            DEVELOP_BRANCH_KEY,
            RELEASE_BRANCH_KEY,
            FEATURE_BRANCH_KEY,
            PULL_REQUEST_BRANCH_KEY,
            HOTFIX_BRANCH_KEY,
            SUPPORT_BRANCH_KEY,
        ])),
    );

    config.branches = branches;
    config
}

/// GitHubFlow: main plus release, feature and pull-request branches
pub fn github_flow() -> GitVersionConfiguration {
    let mut config = base(Workflow::GitHubFlow);
    let mut branches = BTreeMap::new();

    branches.insert(
        MAIN_BRANCH_KEY.to_string(),
        main_branch(Vec::new(), DeploymentMode::ContinuousDelivery),
    );
    branches.insert(
        RELEASE_BRANCH_KEY.to_string(),
        release_branch(keys(&[MAIN_BRANCH_KEY, RELEASE_BRANCH_KEY])),
    );
    branches.insert(
        FEATURE_BRANCH_KEY.to_string(),
        feature_branch(
            IncrementStrategy::Inherit,
            keys(&[MAIN_BRANCH_KEY, RELEASE_BRANCH_KEY, FEATURE_BRANCH_KEY]),
            DeploymentMode::ManualDeployment,
        ),
    );
    branches.insert(
        PULL_REQUEST_BRANCH_KEY.to_string(),
        pull_request_branch(keys(&[
            MAIN_BRANCH_KEY,
            RELEASE_BRANCH_KEY,
            FEATURE_BRANCH_KEY,
        ])),
    );
    branches.insert(
        UNKNOWN_BRANCH_KEY.to_string(),
        unknown_branch(keys(&[
            MAIN_BRANCH_KEY,
            RELEASE_BRANCH_KEY,
            FEATURE_BRANCH_KEY,
            PULL_REQUEST_BRANCH_KEY,
        ])),
    );

    config.branches = branches;
    config
}

/// Trunk based: mainline replay on main, short-lived branches around it
pub fn trunk_based() -> GitVersionConfiguration {
    let mut config = base(Workflow::TrunkBased);
    config.strategies = vec![
        VersionStrategyKind::ConfiguredNextVersion,
        VersionStrategyKind::Mainline,
    ];
    let mut branches = BTreeMap::new();

    branches.insert(
        MAIN_BRANCH_KEY.to_string(),
        BranchConfiguration {
            commit_message_incrementing: Some(CommitMessageIncrementMode::Enabled),
            ..main_branch(Vec::new(), DeploymentMode::ContinuousDelivery)
        },
    );
    branches.insert(
        FEATURE_BRANCH_KEY.to_string(),
        feature_branch(
            IncrementStrategy::Minor,
            keys(&[MAIN_BRANCH_KEY]),
            DeploymentMode::ContinuousDelivery,
        ),
    );
    branches.insert(
        HOTFIX_BRANCH_KEY.to_string(),
        BranchConfiguration {
            regex: Some(HOTFIX_REGEX.to_string()),
            increment: Some(IncrementStrategy::Patch),
            label: Some(super::types::BRANCH_NAME_PLACEHOLDER.to_string()),
            source_branches: keys(&[MAIN_BRANCH_KEY]),
            prevent_increment: prevent(None, None, Some(false)),
            deployment_mode: Some(DeploymentMode::ContinuousDelivery),
            is_release_branch: Some(false),
            is_main_branch: Some(false),
            pre_release_weight: Some(30000),
            ..Default::default()
        },
    );
    branches.insert(
        PULL_REQUEST_BRANCH_KEY.to_string(),
        pull_request_branch(keys(&[
            MAIN_BRANCH_KEY,
            FEATURE_BRANCH_KEY,
            HOTFIX_BRANCH_KEY,
        ])),
    );
    branches.insert(
        UNKNOWN_BRANCH_KEY.to_string(),
        BranchConfiguration {
            increment: Some(IncrementStrategy::Patch),
            ..unknown_branch(keys(&[MAIN_BRANCH_KEY]))
        },
    );

    config.branches = branches;
    config
}
