//! Versions named by merged release branches

use tracing::trace;

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::merge_message::MergeMessage;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// Merge commits whose message names a release branch carrying a version
pub struct MergeMessageStrategy;

impl VersionStrategy for MergeMessageStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::MergeMessage
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !config.track_merge_message {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for commit in ctx.history().iter().filter(|c| c.is_merge()) {
            let Some(merge) = MergeMessage::parse(&commit.message, ctx.config) else {
                continue;
            };
            if !ctx.config.is_release_branch(&merge.merged_branch) {
                trace!(branch = %merge.merged_branch, "merged branch is not a release branch");
                continue;
            }
            let Some(version) = merge.version else {
                continue;
            };
            versions.push(BaseVersion::new(
                self.kind(),
                format!("Merge message '{}'", commit.summary()),
                !config.prevent_increment_of_merged_branch,
                version,
                Some(commit.clone()),
            ));
        }
        Ok(versions)
    }
}
