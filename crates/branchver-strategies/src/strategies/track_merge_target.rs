//! Tags carried in by merged branches

use std::collections::HashMap;

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::{GitVersionContext, TaggedVersion};
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// For each merge in history, tags on the merged-in side count from the merge
pub struct TrackMergeTargetStrategy;

impl VersionStrategy for TrackMergeTargetStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TrackMergeTarget
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !config.track_merge_target {
            return Ok(Vec::new());
        }

        let mut by_sha: HashMap<&str, Vec<&TaggedVersion>> = HashMap::new();
        for tagged in ctx.tagged_versions() {
            by_sha.entry(tagged.commit.sha.as_str()).or_default().push(tagged);
        }
        if by_sha.is_empty() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for merge in ctx.history().iter().filter(|c| c.is_merge()) {
            let mainline_parent = &merge.parents[0];
            for merged_head in &merge.parents[1..] {
                for commit in ctx.repo.commits_between(Some(mainline_parent), merged_head)? {
                    let Some(tags) = by_sha.get(commit.sha.as_str()) else {
                        continue;
                    };
                    for tagged in tags {
                        versions.push(BaseVersion::new(
                            self.kind(),
                            format!("Git tag '{}' merged in by {}", tagged.tag.name, merge.short_sha),
                            !config.prevent_increment_when_branch_merged,
                            tagged.version.clone(),
                            Some(merge.clone()),
                        ));
                    }
                }
            }
        }
        Ok(versions)
    }
}
