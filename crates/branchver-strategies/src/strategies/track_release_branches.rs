//! Live release branches and main branch tags seen from develop

use tracing::trace;

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::branch_name::version_in_branch_name;
use crate::context::GitVersionContext;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// Versions of release branches forked off this branch, plus main branch tags
pub struct TrackReleaseBranchesStrategy;

impl TrackReleaseBranchesStrategy {
    fn release_branch_versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let repo = ctx.repo;
        let current = &ctx.current_commit;
        let mut versions = Vec::new();

        for branch in repo.branches()? {
            if branch.name == ctx.branch.name || !ctx.config.is_release_branch(&branch.name) {
                continue;
            }
            let Some(found) = version_in_branch_name(
                &config.version_in_branch_pattern,
                &config.tag_prefix,
                &branch.name,
            ) else {
                continue;
            };
            let Some(base) = repo.merge_base(&branch.tip_sha, &current.sha)? else {
                continue;
            };
            if base == current.sha {
                trace!(branch = %branch.name, "release branch starts at the current commit");
                continue;
            }
            versions.push(
                BaseVersion::new(
                    self.kind(),
                    format!("Release branch '{}'", branch.name),
                    true,
                    found.version,
                    Some(repo.commit(&base)?),
                )
                .with_branch_name_override(found.name_without_version),
            );
        }
        Ok(versions)
    }

    fn main_branch_tags(&self, ctx: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
        let mut versions = Vec::new();
        for branch in ctx.repo.branches()? {
            if !ctx.config.is_main_branch(&branch.name) {
                continue;
            }
            for tagged in ctx.tagged_versions_from(&branch.tip_sha)? {
                if !ctx.is_reachable(&tagged.commit.sha) {
                    continue;
                }
                versions.push(BaseVersion::new(
                    self.kind(),
                    format!("Git tag '{}' on '{}'", tagged.tag.name, branch.name),
                    tagged.commit.sha != ctx.current_commit.sha,
                    tagged.version,
                    Some(tagged.commit),
                ));
            }
        }
        Ok(versions)
    }
}

impl VersionStrategy for TrackReleaseBranchesStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TrackReleaseBranches
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !config.tracks_release_branches {
            return Ok(Vec::new());
        }
        let mut versions = self.release_branch_versions(ctx, config)?;
        versions.extend(self.main_branch_tags(ctx)?);
        Ok(versions)
    }
}
