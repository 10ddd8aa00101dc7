//! Effective branch configuration resolution
//!
//! A branch whose configured increment is `Inherit` takes the increment of
//! the branch it was created from. Candidates are the repository branches
//! whose configuration key is listed in `source-branches` and that share
//! history with the branch; the most recent fork point wins.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use branchver_core::error::Result;
use branchver_core::{BranchConfiguration, EffectiveConfiguration, GitVersionConfiguration};
use branchver_git::{BranchInfo, RepositoryProvider};

/// A resolved configuration and the branch the increment came from
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveBranchConfiguration {
    pub branch: BranchInfo,
    pub value: EffectiveConfiguration,
}

/// Resolve the effective configurations for `branch`.
///
/// An empty result means no source branch could supply an increment and the
/// defaults are `Inherit` too.
#[instrument(skip_all, fields(branch = %branch.name))]
pub fn resolve_effective_configurations(
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    branch: &BranchInfo,
) -> Result<Vec<EffectiveBranchConfiguration>> {
    let branches = repo.branches()?;
    let mut chain = HashSet::new();
    let resolved = resolve(repo, config, branch, &branches, &mut chain)?;
    debug!(count = resolved.len(), "resolved effective configuration");
    Ok(resolved)
}

fn resolve(
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    branch: &BranchInfo,
    branches: &[BranchInfo],
    chain: &mut HashSet<String>,
) -> Result<Vec<EffectiveBranchConfiguration>> {
    let key = config.find_branch_key(&branch.name);
    let merged = config.branch_configuration_for(&branch.name);
    let increment = merged.increment_or_inherit();

    if !increment.is_inherit() {
        return Ok(vec![EffectiveBranchConfiguration {
            branch: branch.clone(),
            value: EffectiveConfiguration::new(config, key, &merged, increment),
        }]);
    }

    chain.insert(branch.name.clone());
    let targets = source_branch_targets(repo, config, branch, &merged, branches, chain)?;
    let mut inherited = Vec::new();
    for target in &targets {
        trace!(target = %target.name, "inheriting increment");
        let parents = resolve(repo, config, target, branches, chain)?;
        if !parents.is_empty() {
            inherited = parents
                .into_iter()
                .map(|parent| EffectiveBranchConfiguration {
                    branch: parent.branch,
                    value: EffectiveConfiguration::new(config, key, &merged, parent.value.increment),
                })
                .collect();
            break;
        }
    }
    chain.remove(&branch.name);

    if !inherited.is_empty() {
        return Ok(inherited);
    }

    let fallback = config.branch_defaults.increment_or_inherit();
    if fallback.is_inherit() {
        debug!(branch = %branch.name, "no source branch supplies an increment");
        return Ok(Vec::new());
    }
    Ok(vec![EffectiveBranchConfiguration {
        branch: branch.clone(),
        value: EffectiveConfiguration::new(config, key, &merged, fallback),
    }])
}

/// Branches this one may have been created from, most recent fork point first
fn source_branch_targets(
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    branch: &BranchInfo,
    merged: &BranchConfiguration,
    branches: &[BranchInfo],
    chain: &HashSet<String>,
) -> Result<Vec<BranchInfo>> {
    let mut targets = Vec::new();
    for candidate in branches {
        if candidate.name == branch.name || chain.contains(&candidate.name) {
            continue;
        }
        let Some(key) = config.find_branch_key(&candidate.name) else {
            continue;
        };
        if !merged.source_branches.iter().any(|source| source == key) {
            continue;
        }
        let Some(base) = repo.merge_base(&branch.tip_sha, &candidate.tip_sha)? else {
            continue;
        };
        let fork_point = repo.commit(&base)?.when;
        targets.push((fork_point, candidate.clone()));
    }

    targets.sort_by(|(a_when, a), (b_when, b)| b_when.cmp(a_when).then_with(|| a.name.cmp(&b.name)));
    Ok(targets.into_iter().map(|(_, branch)| branch).collect())
}

/// Source branch keys, joined for error messages
pub fn describe_sources(config: &GitVersionConfiguration, branch_name: &str) -> String {
    config
        .branch_configuration_for(branch_name)
        .source_branches
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::{git_flow, github_flow};
    use branchver_core::{IncrementStrategy, VersionField};
    use branchver_git::MemoryRepository;

    fn branch(repo: &MemoryRepository, name: &str) -> BranchInfo {
        BranchInfo::new(name, repo.tip(name).unwrap())
    }

    #[test]
    fn test_concrete_increment_is_returned_directly() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        let config = git_flow();

        let resolved = resolve_effective_configurations(&repo, &config, &branch(&repo, "main")).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].branch.name, "main");
        assert_eq!(resolved[0].value.increment, IncrementStrategy::Patch);
    }

    #[test]
    fn test_feature_inherits_from_develop() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        repo.branch_from("develop", "main").unwrap();
        repo.commit_on("develop", "d1").unwrap();
        repo.branch_from("feature/login", "develop").unwrap();
        repo.commit_on("feature/login", "f1").unwrap();
        let config = git_flow();

        let resolved =
            resolve_effective_configurations(&repo, &config, &branch(&repo, "feature/login")).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].branch.name, "develop");
        assert_eq!(resolved[0].value.increment, IncrementStrategy::Minor);
        assert_eq!(resolved[0].value.branch_key.as_deref(), Some("feature"));
        assert_eq!(
            resolved[0].value.increment.to_version_field(),
            Some(VersionField::Minor)
        );
    }

    #[test]
    fn test_most_recent_fork_point_wins_over_name() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "root").unwrap();
        repo.branch_from("develop", "main").unwrap();
        repo.commit_on("develop", "d1").unwrap();
        repo.commit_on("main", "m1").unwrap();
        repo.branch_from("feature/x", "main").unwrap();
        repo.commit_on("feature/x", "f1").unwrap();
        let config = git_flow();

        let resolved =
            resolve_effective_configurations(&repo, &config, &branch(&repo, "feature/x")).unwrap();
        assert_eq!(resolved[0].branch.name, "main");
        assert_eq!(resolved[0].value.increment, IncrementStrategy::Patch);
    }

    #[test]
    fn test_orphaned_branch_with_inherit_defaults_is_empty() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("feature/alone", "root").unwrap();
        let config = github_flow();

        let resolved = resolve_effective_configurations(
            &repo,
            &config,
            &BranchInfo::new("feature/alone", root),
        )
        .unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_orphaned_branch_takes_concrete_default() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("feature/alone", "root").unwrap();
        let mut config = github_flow();
        config.branch_defaults.increment = Some(IncrementStrategy::Major);

        let resolved = resolve_effective_configurations(
            &repo,
            &config,
            &BranchInfo::new("feature/alone", root),
        )
        .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].value.increment, IncrementStrategy::Major);
    }

    #[test]
    fn test_cycle_guard_terminates() {
        // two inherit branches that only know each other
        let mut repo = MemoryRepository::new();
        repo.commit_on("feature/a", "root").unwrap();
        repo.branch_from("feature/b", "feature/a").unwrap();
        let config = github_flow();

        let resolved =
            resolve_effective_configurations(&repo, &config, &branch(&repo, "feature/a")).unwrap();
        assert!(resolved.is_empty());
        assert_eq!(describe_sources(&config, "feature/a"), "main, release, feature");
    }
}
