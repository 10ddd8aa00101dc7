//! Calculation types

use std::fmt;

use serde::Serialize;

use branchver_core::{EffectiveConfiguration, VersionStrategyKind};
use branchver_git::CommitInfo;

use crate::version::SemanticVersion;

/// A candidate version plus the commit that justifies it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseVersion {
    /// Human readable origin, e.g. `Git tag 'v1.0.0'`
    pub source: String,
    /// Whether the branch increment still has to be applied
    pub should_increment: bool,
    pub semantic_version: SemanticVersion,
    /// Commit counts and increments are measured from here
    pub base_version_source: Option<CommitInfo>,
    /// Branch name to use for the label instead of the real one
    pub branch_name_override: Option<String>,
    /// Strategy that produced the candidate
    pub strategy: VersionStrategyKind,
}

impl BaseVersion {
    pub fn new(
        strategy: VersionStrategyKind,
        source: impl Into<String>,
        should_increment: bool,
        semantic_version: SemanticVersion,
        base_version_source: Option<CommitInfo>,
    ) -> Self {
        Self {
            source: source.into(),
            should_increment,
            semantic_version,
            base_version_source,
            branch_name_override: None,
            strategy,
        }
    }

    /// Set the branch name used for the label
    pub fn with_branch_name_override(mut self, name: impl Into<String>) -> Self {
        self.branch_name_override = Some(name.into());
        self
    }

    /// Sha of the source commit, if any
    pub fn source_sha(&self) -> Option<&str> {
        self.base_version_source.as_ref().map(|c| c.sha.as_str())
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} with commit {} (increment: {})",
            self.source,
            self.semantic_version,
            self.base_version_source
                .as_ref()
                .map(|c| c.short_sha.as_str())
                .unwrap_or("external"),
            if self.should_increment { "yes" } else { "no" },
        )
    }
}

/// The winning base version and the version after its increment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextVersion {
    pub base: BaseVersion,
    pub incremented: SemanticVersion,
    /// Configuration the winner was calculated under
    pub configuration: EffectiveConfiguration,
}
