//! Version tags reachable from the current commit

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// One candidate per reachable version tag not newer than the current commit
pub struct TaggedCommitStrategy;

impl VersionStrategy for TaggedCommitStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TaggedCommit
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        _config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let current = &ctx.current_commit;
        Ok(ctx
            .tagged_versions()
            .iter()
            .filter(|tagged| tagged.commit.when <= current.when)
            .map(|tagged| {
                BaseVersion::new(
                    self.kind(),
                    format!("Git tag '{}'", tagged.tag.name),
                    tagged.commit.sha != current.sha,
                    tagged.version.clone(),
                    Some(tagged.commit.clone()),
                )
            })
            .collect())
    }
}
