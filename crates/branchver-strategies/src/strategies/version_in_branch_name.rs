//! Version embedded in a release branch name

use tracing::debug;

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};
use branchver_git::CommitInfo;

use crate::branch_name::version_in_branch_name;
use crate::context::GitVersionContext;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// `release/1.2.0` proposes 1.2.0, sourced where the branch forked
pub struct VersionInBranchNameStrategy;

impl VersionInBranchNameStrategy {
    /// Newest merge base with a branch this one can be created from, else the root
    fn fork_point(ctx: &GitVersionContext<'_>, config: &EffectiveConfiguration) -> Result<Option<CommitInfo>> {
        let repo = ctx.repo;
        let current = &ctx.current_commit.sha;

        let mut newest: Option<CommitInfo> = None;
        for branch in repo.branches()? {
            if branch.name == ctx.branch.name {
                continue;
            }
            let Some(key) = ctx.config.find_branch_key(&branch.name) else {
                continue;
            };
            if !config.source_branches.iter().any(|source| source == key) {
                continue;
            }
            let Some(base) = repo.merge_base(current, &branch.tip_sha)? else {
                continue;
            };
            let commit = repo.commit(&base)?;
            if newest.as_ref().map_or(true, |n| commit.when > n.when) {
                newest = Some(commit);
            }
        }

        match newest {
            Some(commit) => Ok(Some(commit)),
            None => repo.find_root(current),
        }
    }
}

impl VersionStrategy for VersionInBranchNameStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::VersionInBranchName
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !config.is_release_branch {
            return Ok(Vec::new());
        }
        let Some(found) = version_in_branch_name(
            &config.version_in_branch_pattern,
            &config.tag_prefix,
            &ctx.branch.name,
        ) else {
            debug!(branch = %ctx.branch.name, "release branch without a version");
            return Ok(Vec::new());
        };

        let source = Self::fork_point(ctx, config)?;
        Ok(vec![BaseVersion::new(
            self.kind(),
            format!("Version in branch name '{}'", ctx.branch.name),
            false,
            found.version,
            source,
        )
        .with_branch_name_override(found.name_without_version)])
    }
}
