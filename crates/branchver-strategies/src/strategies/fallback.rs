//! Guaranteed candidate sourced at the root commit

use branchver_core::error::{RepositoryError, Result};
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;
use crate::version::SemanticVersion;

/// The configured fallback version, counted from the first commit
pub struct FallbackStrategy;

impl VersionStrategy for FallbackStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::Fallback
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        _config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let current = &ctx.current_commit;
        let root = ctx
            .repo
            .find_root(&current.sha)?
            .ok_or_else(|| RepositoryError::NoRootCommit(current.sha.clone()))?;

        let version: SemanticVersion = ctx.config.fallback_version.parse()?;

        Ok(vec![BaseVersion::new(
            self.kind(),
            "Fallback base version",
            ctx.config.fallback_should_increment,
            version,
            Some(root),
        )])
    }
}
