//! `next-version` from configuration

use tracing::warn;

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, SemanticVersionFormat, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;
use crate::version::SemanticVersion;

/// Proposes the configured next version; a tagged commit keeps its tag
pub struct ConfiguredNextVersionStrategy;

impl VersionStrategy for ConfiguredNextVersionStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::ConfiguredNextVersion
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let Some(next) = config.next_version.as_deref() else {
            return Ok(Vec::new());
        };
        if ctx.is_current_commit_tagged() {
            return Ok(Vec::new());
        }

        match SemanticVersion::try_parse(next, Some(&config.tag_prefix), SemanticVersionFormat::Loose)
        {
            Some(version) => Ok(vec![BaseVersion::new(
                self.kind(),
                "NextVersion in configuration",
                false,
                version,
                None,
            )]),
            None => {
                warn!(next_version = next, "next-version is not a version");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::git_flow;
    use branchver_git::MemoryRepository;

    use crate::test_support::{context, effective};

    #[test]
    fn test_uses_next_version() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        let mut config = git_flow();
        config.next_version = Some("2.1".to_string());

        let ctx = context(&repo, &config, "main");
        let versions = ConfiguredNextVersionStrategy
            .versions(&ctx, &effective(&repo, &config, "main"))
            .unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(2, 1, 0));
        assert!(!versions[0].should_increment);
        assert!(versions[0].base_version_source.is_none());
    }

    #[test]
    fn test_skipped_on_tagged_commit() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        repo.tag("1.0.0", "main").unwrap();
        let mut config = git_flow();
        config.next_version = Some("2.0.0".to_string());

        let ctx = context(&repo, &config, "main");
        let versions = ConfiguredNextVersionStrategy
            .versions(&ctx, &effective(&repo, &config, "main"))
            .unwrap();
        assert!(versions.is_empty());
    }
}
