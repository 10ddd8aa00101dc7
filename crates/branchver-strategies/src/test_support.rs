//! Helpers for graph scenario tests

use branchver_core::{EffectiveConfiguration, GitVersionConfiguration};
use branchver_git::{BranchInfo, MemoryRepository, RepositoryProvider};

use crate::context::GitVersionContext;
use crate::effective::resolve_effective_configurations;

/// Context at the tip of `branch`
pub fn context<'a>(
    repo: &'a MemoryRepository,
    config: &'a GitVersionConfiguration,
    branch: &str,
) -> GitVersionContext<'a> {
    let tip = repo.tip(branch).unwrap().to_string();
    let current = repo.commit(&tip).unwrap();
    GitVersionContext::new(repo, config, BranchInfo::new(branch, tip), current).unwrap()
}

/// First effective configuration of `branch`
pub fn effective(
    repo: &MemoryRepository,
    config: &GitVersionConfiguration,
    branch: &str,
) -> EffectiveConfiguration {
    let info = BranchInfo::new(branch, repo.tip(branch).unwrap());
    resolve_effective_configurations(repo, config, &info)
        .unwrap()
        .remove(0)
        .value
}
