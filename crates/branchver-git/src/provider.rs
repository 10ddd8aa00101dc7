//! The read-only repository capability consumed by the version calculation

use std::collections::{HashSet, VecDeque};

use branchver_core::error::{RepositoryError, Result};

use crate::types::{BranchInfo, CommitInfo, TagInfo, SHORT_SHA_LEN};

/// Read-only view of a repository snapshot
///
/// Every query is synchronous and side-effect free. Implementations may be
/// moved to another thread but are queried from one thread at a time.
pub trait RepositoryProvider: Send {
    /// Local branches
    fn branches(&self) -> Result<Vec<BranchInfo>>;

    /// Tags peeled to commits
    fn tags(&self) -> Result<Vec<TagInfo>>;

    /// Commit by full sha, `None` when absent
    fn find_commit(&self, sha: &str) -> Result<Option<CommitInfo>>;

    /// Commits reachable from `to` but not from `from`, newest first in
    /// topological order (children before parents)
    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>>;

    /// Best common ancestor of two commits
    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>>;

    /// Paths touched by a commit relative to its first parent
    fn changed_paths(&self, sha: &str) -> Result<Vec<String>>;

    /// Abbreviated display form of a sha
    fn short_sha(&self, sha: &str) -> String {
        sha.chars().take(SHORT_SHA_LEN).collect()
    }

    /// Commit by sha, failing when absent
    fn commit(&self, sha: &str) -> Result<CommitInfo> {
        self.find_commit(sha)?
            .ok_or_else(|| RepositoryError::CommitNotFound(sha.to_string()).into())
    }

    /// Branch by friendly name
    fn find_branch(&self, name: &str) -> Result<Option<BranchInfo>> {
        Ok(self.branches()?.into_iter().find(|b| b.name == name))
    }

    /// Tags whose target is `sha`
    fn tags_on(&self, sha: &str) -> Result<Vec<TagInfo>> {
        Ok(self
            .tags()?
            .into_iter()
            .filter(|t| t.target_sha == sha)
            .collect())
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.merge_base(ancestor, descendant)?.as_deref() == Some(ancestor))
    }

    /// First-parent history from `from` (inclusive) back to `stop` (exclusive),
    /// newest first
    fn first_parent_chain(&self, from: &str, stop: Option<&str>) -> Result<Vec<CommitInfo>> {
        let mut chain = Vec::new();
        let mut next = Some(from.to_string());
        while let Some(sha) = next {
            if stop == Some(sha.as_str()) {
                break;
            }
            let commit = self.commit(&sha)?;
            next = commit.first_parent().map(str::to_string);
            chain.push(commit);
        }
        Ok(chain)
    }

    /// Breadth-first search over parents for the first parentless commit
    fn find_root(&self, from: &str) -> Result<Option<CommitInfo>> {
        let mut queue = VecDeque::from([from.to_string()]);
        let mut seen = HashSet::new();
        while let Some(sha) = queue.pop_front() {
            if !seen.insert(sha.clone()) {
                continue;
            }
            let Some(commit) = self.find_commit(&sha)? else {
                continue;
            };
            if commit.is_root() {
                return Ok(Some(commit));
            }
            queue.extend(commit.parents.iter().cloned());
        }
        Ok(None)
    }
}
