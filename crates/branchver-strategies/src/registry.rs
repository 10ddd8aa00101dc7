//! Strategy registry

use std::sync::Arc;

use tracing::debug;

use branchver_core::{GitVersionConfiguration, VersionStrategyKind};

use crate::strategies::{
    ConfiguredNextVersionStrategy, FallbackStrategy, MainlineStrategy, MergeMessageStrategy,
    TaggedCommitStrategy, TrackMergeTargetStrategy, TrackReleaseBranchesStrategy,
    VersionInBranchNameStrategy,
};
use crate::traits::VersionStrategy;

/// One strategy per [`VersionStrategyKind`], in evaluation order
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn VersionStrategy>>,
}

impl StrategyRegistry {
    /// The built-in strategies
    pub fn new() -> Self {
        let strategies: Vec<Arc<dyn VersionStrategy>> = vec![
            Arc::new(ConfiguredNextVersionStrategy),
            Arc::new(TaggedCommitStrategy),
            Arc::new(MergeMessageStrategy),
            Arc::new(VersionInBranchNameStrategy),
            Arc::new(TrackMergeTargetStrategy),
            Arc::new(TrackReleaseBranchesStrategy),
            Arc::new(MainlineStrategy),
            Arc::new(FallbackStrategy),
        ];
        Self { strategies }
    }

    /// Swap in `strategy` for the one of the same kind
    pub fn replace(mut self, strategy: impl VersionStrategy + 'static) -> Self {
        let kind = strategy.kind();
        self.strategies.retain(|existing| existing.kind() != kind);
        self.strategies.push(Arc::new(strategy));
        self.strategies.sort_by_key(|s| s.kind());
        debug!(strategy = kind.as_str(), "strategy replaced");
        self
    }

    pub fn strategy(&self, kind: VersionStrategyKind) -> Option<&Arc<dyn VersionStrategy>> {
        self.strategies.iter().find(|s| s.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<VersionStrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Strategies switched on by `config`; Fallback always is
    pub fn enabled(&self, config: &GitVersionConfiguration) -> Vec<Arc<dyn VersionStrategy>> {
        self.strategies
            .iter()
            .filter(|s| config.is_strategy_enabled(s.kind()))
            .cloned()
            .collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::{git_flow, trunk_based};
    use branchver_core::error::Result;
    use branchver_core::EffectiveConfiguration;
    use branchver_git::MemoryRepository;

    use crate::calculator::NextVersionCalculator;
    use crate::context::GitVersionContext;
    use crate::effective::resolve_effective_configurations;
    use crate::test_support::context;
    use crate::types::BaseVersion;
    use crate::version::SemanticVersion;

    /// Claims every commit is tagged 7.0.0
    struct PinnedTag;

    impl VersionStrategy for PinnedTag {
        fn kind(&self) -> VersionStrategyKind {
            VersionStrategyKind::TaggedCommit
        }

        fn versions(
            &self,
            ctx: &GitVersionContext<'_>,
            _config: &EffectiveConfiguration,
        ) -> Result<Vec<BaseVersion>> {
            Ok(vec![BaseVersion::new(
                self.kind(),
                "pinned",
                false,
                SemanticVersion::new(7, 0, 0),
                Some(ctx.current_commit.clone()),
            )])
        }
    }

    #[test]
    fn test_built_ins_in_evaluation_order() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.kinds(), VersionStrategyKind::all());
        assert!(registry.strategy(VersionStrategyKind::Mainline).is_some());
    }

    #[test]
    fn test_enabled_follows_configuration() {
        let registry = StrategyRegistry::new();

        let trunk: Vec<_> = registry.enabled(&trunk_based()).iter().map(|s| s.kind()).collect();
        assert_eq!(
            trunk,
            vec![
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::Mainline,
                VersionStrategyKind::Fallback,
            ]
        );

        let flow = registry.enabled(&git_flow());
        assert_eq!(flow.len(), 7);
        assert!(flow.iter().all(|s| s.kind() != VersionStrategyKind::Mainline));
    }

    #[test]
    fn test_replaced_strategy_is_used() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "one").unwrap();
        let config = git_flow();

        let registry = StrategyRegistry::new().replace(PinnedTag);
        assert_eq!(registry.kinds(), VersionStrategyKind::all());
        assert_eq!(
            registry.strategy(VersionStrategyKind::TaggedCommit).map(|s| s.name()),
            Some("tagged-commit")
        );

        let ctx = context(&repo, &config, "main");
        let configurations = resolve_effective_configurations(&repo, &config, &ctx.branch).unwrap();
        let next = NextVersionCalculator::with_registry(registry)
            .calculate(&ctx, &configurations)
            .unwrap();
        assert_eq!(next.incremented, SemanticVersion::new(7, 0, 0));
        assert_eq!(next.base.source, "pinned");
    }
}
