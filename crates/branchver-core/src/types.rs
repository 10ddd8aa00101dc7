//! Core types for branchver

use serde::{Deserialize, Serialize};

/// Which part of a version a bump affects
///
/// Ordered by severity, so `max` picks the strongest bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionField {
    /// No bump
    None,
    /// Patch bump
    Patch,
    /// Minor bump
    Minor,
    /// Major bump
    Major,
}

impl VersionField {
    /// Returns the string representation of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl std::fmt::Display for VersionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Increment configured for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementStrategy {
    /// Take the increment of the branch this one was created from
    Inherit,
    /// Never bump
    None,
    /// Patch bump
    Patch,
    /// Minor bump
    Minor,
    /// Major bump
    Major,
}

impl IncrementStrategy {
    /// The bump this strategy stands for, `None` for `Inherit`
    pub fn to_version_field(self) -> Option<VersionField> {
        match self {
            Self::Inherit => None,
            Self::None => Some(VersionField::None),
            Self::Patch => Some(VersionField::Patch),
            Self::Minor => Some(VersionField::Minor),
            Self::Major => Some(VersionField::Major),
        }
    }

    /// Whether the increment must be looked up elsewhere
    pub fn is_inherit(self) -> bool {
        matches!(self, Self::Inherit)
    }
}

impl std::str::FromStr for IncrementStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inherit" => Ok(Self::Inherit),
            "none" => Ok(Self::None),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(format!("Unknown increment strategy: {}", s)),
        }
    }
}

/// How versions on a branch are meant to be shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentMode {
    /// Every commit is a release candidate; pre-release number from tags
    ContinuousDelivery,
    /// Every commit is deployed; commit count becomes the pre-release number
    ContinuousDeployment,
    /// Versions only move when tagged
    ManualDeployment,
}

/// Which commits are scanned for `+semver:` directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitMessageIncrementMode {
    /// Scan every commit
    Enabled,
    /// Ignore commit messages
    Disabled,
    /// Scan only merge commits
    MergeMessageOnly,
}

/// How strictly version strings are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticVersionFormat {
    /// Requires major.minor.patch
    Strict,
    /// Allows missing minor/patch
    Loose,
}

/// Layout of generated assembly versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblyVersioningScheme {
    /// `{major}.{minor}.{patch}.{tag number}`
    MajorMinorPatchTag,
    /// `{major}.{minor}.{patch}.0`
    MajorMinorPatch,
    /// `{major}.{minor}.0.0`
    MajorMinor,
    /// `{major}.0.0.0`
    Major,
    /// Not emitted
    None,
}

/// Base version strategies, in declared evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionStrategyKind {
    /// `next-version` from configuration
    ConfiguredNextVersion,
    /// Tags reachable from the current commit
    TaggedCommit,
    /// Versions named in release-branch merge messages
    MergeMessage,
    /// Version embedded in the current branch name
    VersionInBranchName,
    /// Tags on branches merged into the current branch
    TrackMergeTarget,
    /// Versions of live release branches
    TrackReleaseBranches,
    /// Replay of mainline history
    Mainline,
    /// Guaranteed candidate from the root commit
    Fallback,
}

impl VersionStrategyKind {
    /// All strategies in declared order
    pub fn all() -> &'static [VersionStrategyKind] {
        &[
            Self::ConfiguredNextVersion,
            Self::TaggedCommit,
            Self::MergeMessage,
            Self::VersionInBranchName,
            Self::TrackMergeTarget,
            Self::TrackReleaseBranches,
            Self::Mainline,
            Self::Fallback,
        ]
    }

    /// Returns the string representation of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfiguredNextVersion => "configured-next-version",
            Self::TaggedCommit => "tagged-commit",
            Self::MergeMessage => "merge-message",
            Self::VersionInBranchName => "version-in-branch-name",
            Self::TrackMergeTarget => "track-merge-target",
            Self::TrackReleaseBranches => "track-release-branches",
            Self::Mainline => "mainline",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for VersionStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named branching-model presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Workflow {
    /// main/develop/release/feature/hotfix/support
    #[default]
    GitFlow,
    /// main plus short-lived branches
    GitHubFlow,
    /// mainline replay on main
    TrunkBased,
}

impl Workflow {
    /// Returns the string representation of the workflow
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitFlow => "GitFlow",
            Self::GitHubFlow => "GitHubFlow",
            Self::TrunkBased => "TrunkBased",
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Workflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "gitflow" | "gitflowv1" => Ok(Self::GitFlow),
            "githubflow" | "githubflowv1" => Ok(Self::GitHubFlow),
            "trunkbased" | "trunk" | "mainline" => Ok(Self::TrunkBased),
            _ => Err(format!("Unknown workflow: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_version_field_ordering() {
        assert!(VersionField::Major > VersionField::Minor);
        assert!(VersionField::Minor > VersionField::Patch);
        assert!(VersionField::Patch > VersionField::None);
        assert_eq!(VersionField::Patch.max(VersionField::Minor), VersionField::Minor);
    }

    #[test]
    fn test_increment_strategy_from_str() {
        assert_eq!(IncrementStrategy::from_str("MINOR").unwrap(), IncrementStrategy::Minor);
        assert_eq!(IncrementStrategy::from_str("inherit").unwrap(), IncrementStrategy::Inherit);
        assert!(IncrementStrategy::from_str("huge").is_err());
        assert_eq!(IncrementStrategy::Inherit.to_version_field(), None);
        assert_eq!(
            IncrementStrategy::None.to_version_field(),
            Some(VersionField::None)
        );
    }

    #[test]
    fn test_workflow_from_str() {
        assert_eq!(Workflow::from_str("GitFlow/v1").unwrap(), Workflow::GitFlow);
        assert_eq!(Workflow::from_str("github-flow").unwrap(), Workflow::GitHubFlow);
        assert_eq!(Workflow::from_str("trunk-based").unwrap(), Workflow::TrunkBased);
        assert!(Workflow::from_str("svn").is_err());
    }

    #[test]
    fn test_strategy_declared_order() {
        let all = VersionStrategyKind::all();
        assert_eq!(all.first(), Some(&VersionStrategyKind::ConfiguredNextVersion));
        assert_eq!(all.last(), Some(&VersionStrategyKind::Fallback));
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }
}
