//! Branch operations

use git2::BranchType;
use tracing::{debug, instrument};

use branchver_core::error::Result;

use crate::repository::GitRepo;
use crate::types::BranchInfo;

impl GitRepo {
    /// Local branches with their tip commits
    #[instrument(skip(self))]
    pub fn local_branches(&self) -> Result<Vec<BranchInfo>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                continue;
            };
            let tip = branch.get().peel_to_commit()?;
            branches.push(BranchInfo::new(name, tip.id().to_string()));
        }

        branches.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = branches.len(), "listed local branches");
        Ok(branches)
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::RepositoryProvider;
    use crate::test_support::{commit_file, init_repo};

    #[test]
    fn test_local_branches() {
        let (temp, repo) = init_repo();
        let sha = commit_file(&temp, &repo, "a.txt", "first", 1_000);

        let head = repo.inner().head().unwrap().peel_to_commit().unwrap();
        repo.inner().branch("release/1.0.0", &head, false).unwrap();

        let branches = repo.branches().unwrap();
        let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["main", "release/1.0.0"]);
        assert!(branches.iter().all(|b| b.tip_sha == sha));
        assert!(repo.find_branch("release/1.0.0").unwrap().is_some());
    }
}
