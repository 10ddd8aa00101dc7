//! Next version selection
//!
//! Every enabled strategy proposes base versions for every effective
//! configuration of the branch. Candidates are filtered, incremented and the
//! highest incremented version wins. Among equal winners the first one is
//! reported with the oldest source of the group.

use tracing::{debug, info, instrument};

use branchver_core::error::{Result, VersionError};
use branchver_core::{EffectiveConfiguration, VersionField, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::effective::EffectiveBranchConfiguration;
use crate::filters::{apply_filters, filters_for};
use crate::increment::IncrementFinder;
use crate::registry::StrategyRegistry;
use crate::types::{BaseVersion, NextVersion};
use crate::version::SemanticVersion;

/// A candidate after its increment, tied to the configuration it was built with
#[derive(Debug, Clone)]
struct Candidate {
    base: BaseVersion,
    incremented: SemanticVersion,
    configuration: EffectiveConfiguration,
}

/// Runs the strategies and picks the next version
pub struct NextVersionCalculator {
    registry: StrategyRegistry,
}

impl NextVersionCalculator {
    /// Calculator over all built-in strategies
    pub fn new() -> Self {
        Self::with_registry(StrategyRegistry::new())
    }

    /// Calculator over a custom registry
    pub fn with_registry(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    #[instrument(skip_all, fields(branch = %ctx.branch.name))]
    pub fn calculate(
        &self,
        ctx: &GitVersionContext<'_>,
        configurations: &[EffectiveBranchConfiguration],
    ) -> Result<NextVersion> {
        let strategies = self.registry.enabled(ctx.config);
        let filters = filters_for(&ctx.config.ignore);
        let release_branch_exists = ctx
            .repo
            .branches()?
            .iter()
            .any(|b| ctx.config.is_release_branch(&b.name));

        let mut candidates = Vec::new();
        for effective in configurations {
            let config = &effective.value;
            let finder = IncrementFinder::new(config);
            debug!(source_branch = %effective.branch.name, increment = ?config.increment, "collecting candidates");

            for strategy in &strategies {
                let mut proposed = strategy.versions(ctx, config)?;
                if strategy.kind() != VersionStrategyKind::Fallback {
                    proposed = apply_filters(proposed, &filters, ctx.repo)?;
                }
                for mut base in proposed {
                    if !release_branch_exists {
                        rebase_deleted_release_merge(ctx, &mut base)?;
                    }
                    let incremented = increment(ctx, &finder, config, &base)?;
                    info!(
                        strategy = strategy.name(),
                        candidate = %base,
                        incremented = %incremented,
                        "base version candidate"
                    );
                    candidates.push(Candidate {
                        base,
                        incremented,
                        configuration: config.clone(),
                    });
                }
            }
        }

        let next = select(candidates)?;
        info!(
            base = %next.base,
            next = %next.incremented,
            "selected base version"
        );
        Ok(next)
    }
}

impl Default for NextVersionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// A merged release branch that no longer exists counts from where it forked
fn rebase_deleted_release_merge(ctx: &GitVersionContext<'_>, base: &mut BaseVersion) -> Result<()> {
    if base.strategy != VersionStrategyKind::MergeMessage {
        return Ok(());
    }
    let Some(merge) = base.base_version_source.as_ref() else {
        return Ok(());
    };
    if merge.parents.len() < 2 {
        return Ok(());
    }
    if let Some(fork) = ctx.repo.merge_base(&merge.parents[0], &merge.parents[1])? {
        debug!(merge = %merge.short_sha, fork = %fork, "release branch was deleted, using fork point");
        base.base_version_source = Some(ctx.repo.commit(&fork)?);
    }
    Ok(())
}

fn increment(
    ctx: &GitVersionContext<'_>,
    finder: &IncrementFinder,
    config: &EffectiveConfiguration,
    base: &BaseVersion,
) -> Result<SemanticVersion> {
    // mainline replay already applied its increments
    if base.strategy == VersionStrategyKind::Mainline {
        return Ok(base.semantic_version.clone());
    }
    let commits = ctx.commits_since(base.source_sha())?;
    let default = config
        .increment
        .to_version_field()
        .unwrap_or(VersionField::Patch);
    let field = finder.determine_increment(base, &commits, default);
    Ok(base.semantic_version.increment(field))
}

fn select(candidates: Vec<Candidate>) -> Result<NextVersion> {
    let highest = candidates
        .iter()
        .map(|c| &c.incremented)
        .max_by(|a, b| a.compare_precedence(b))
        .cloned()
        .ok_or_else(|| VersionError::InvariantViolation("no base version candidates".to_string()))?;

    let tied: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.incremented.compare_precedence(&highest).is_eq())
        .collect();

    let representative = tied[0];
    let oldest_tied = tied
        .iter()
        .filter_map(|c| c.base.base_version_source.as_ref())
        .min_by_key(|source| source.when);

    let source = match oldest_tied {
        Some(source) => source.clone(),
        None => candidates
            .iter()
            .filter(|c| c.base.base_version_source.is_some())
            .max_by(|a, b| {
                a.incremented.compare_precedence(&b.incremented).then_with(|| {
                    let a_when = a.base.base_version_source.as_ref().map(|s| s.when);
                    let b_when = b.base.base_version_source.as_ref().map(|s| s.when);
                    a_when.cmp(&b_when)
                })
            })
            .and_then(|c| c.base.base_version_source.clone())
            .ok_or_else(|| {
                VersionError::InvariantViolation(
                    "no base version candidate has a source commit".to_string(),
                )
            })?,
    };

    let mut base = representative.base.clone();
    base.base_version_source = Some(source);
    Ok(NextVersion {
        base,
        incremented: representative.incremented.clone(),
        configuration: representative.configuration.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::{git_flow, trunk_based};
    use branchver_core::GitVersionConfiguration;
    use branchver_git::MemoryRepository;

    use crate::effective::resolve_effective_configurations;
    use crate::test_support::context;

    fn calculate(repo: &MemoryRepository, config: &GitVersionConfiguration, branch: &str) -> NextVersion {
        let ctx = context(repo, config, branch);
        let configurations = resolve_effective_configurations(repo, config, &ctx.branch).unwrap();
        NextVersionCalculator::new().calculate(&ctx, &configurations).unwrap()
    }

    #[test]
    fn test_fallback_on_untagged_main() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "one").unwrap();
        repo.commit_on("main", "two").unwrap();
        repo.commit_on("main", "three").unwrap();
        let config = git_flow();

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.incremented, SemanticVersion::new(0, 0, 1));
        assert_eq!(next.base.strategy, VersionStrategyKind::Fallback);
        assert_eq!(next.base.source_sha(), Some(root.as_str()));
    }

    #[test]
    fn test_tag_wins_over_fallback() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "one").unwrap();
        repo.tag("1.2.0", "main").unwrap();
        let two = repo.commit_on("main", "two").unwrap();
        repo.tag("1.3.0", "main").unwrap();
        repo.commit_on("main", "three +semver: minor").unwrap();
        let config = git_flow();

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.incremented, SemanticVersion::new(1, 4, 0));
        assert_eq!(next.base.source_sha(), Some(two.as_str()));
    }

    #[test]
    fn test_release_merge_into_develop() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        repo.branch_from("develop", "main").unwrap();
        repo.branch_from("release/2.0.0", "develop").unwrap();
        repo.commit_on("release/2.0.0", "stabilise").unwrap();
        repo.merge("release/2.0.0", "develop").unwrap();
        let config = git_flow();

        let next = calculate(&repo, &config, "develop");
        assert_eq!(next.base.semantic_version, SemanticVersion::new(2, 0, 0));
        assert!(next.base.should_increment);
        assert_eq!(next.incremented, SemanticVersion::new(2, 1, 0));
    }

    #[test]
    fn test_deleted_release_branch_counts_from_fork() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "root").unwrap();
        repo.branch_from("release/1.2.0", "main").unwrap();
        repo.commit_on("release/1.2.0", "fix").unwrap();
        repo.merge("release/1.2.0", "main").unwrap();
        repo.delete_branch("release/1.2.0").unwrap();
        let config = git_flow();

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.incremented, SemanticVersion::new(1, 2, 0));
        assert_eq!(next.base.strategy, VersionStrategyKind::MergeMessage);
        assert_eq!(next.base.source_sha(), Some(root.as_str()));
    }

    #[test]
    fn test_ignored_tag_is_not_a_candidate() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "one").unwrap();
        let two = repo.commit_on("main", "two").unwrap();
        repo.tag("5.0.0", "main").unwrap();
        repo.commit_on("main", "three").unwrap();
        let mut config = git_flow();
        config.ignore.shas = vec![two];

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.base.strategy, VersionStrategyKind::Fallback);
        assert_eq!(next.incremented, SemanticVersion::new(0, 0, 1));
    }

    #[test]
    fn test_mainline_candidate_is_not_incremented_again() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "one").unwrap();
        repo.tag("1.0.0", "main").unwrap();
        repo.commit_on("main", "two").unwrap();
        let config = trunk_based();

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.base.strategy, VersionStrategyKind::Mainline);
        assert_eq!(next.incremented, SemanticVersion::new(1, 0, 1));
    }

    #[test]
    fn test_tie_without_source_borrows_one() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "one").unwrap();
        repo.commit_on("main", "two").unwrap();
        let mut config = git_flow();
        config.next_version = Some("3.0.0".to_string());

        let next = calculate(&repo, &config, "main");
        assert_eq!(next.base.strategy, VersionStrategyKind::ConfiguredNextVersion);
        assert_eq!(next.incremented, SemanticVersion::new(3, 0, 0));
        assert_eq!(next.base.source_sha(), Some(root.as_str()));
    }
}
