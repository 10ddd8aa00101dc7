//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::{Oid, Sort};
use tracing::{debug, instrument};

use branchver_core::error::{RepositoryError, Result};

use crate::repository::GitRepo;
use crate::types::CommitInfo;

fn parse_oid(sha: &str) -> Result<Oid> {
    Oid::from_str(sha).map_err(|_| RepositoryError::CommitNotFound(sha.to_string()).into())
}

impl GitRepo {
    /// Commit by full sha, `None` when it is not in the object database
    pub fn lookup_commit(&self, sha: &str) -> Result<Option<CommitInfo>> {
        let oid = parse_oid(sha)?;
        match self.repo.find_commit(oid) {
            Ok(commit) => Ok(Some(commit_to_info(&commit))),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Commits reachable from `to` and not from `from`, newest first
    #[instrument(skip(self))]
    pub fn walk_range(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(parse_oid(to)?)?;
        if let Some(from) = from {
            revwalk.hide(parse_oid(from)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(commit_to_info(&commit));
        }

        debug!(count = commits.len(), "walked commit range");
        Ok(commits)
    }

    /// Merge base of two commits, `None` for unrelated histories
    pub fn best_common_ancestor(&self, a: &str, b: &str) -> Result<Option<String>> {
        match self.repo.merge_base(parse_oid(a)?, parse_oid(b)?) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Paths added, removed or modified by a commit against its first parent
    pub fn paths_touched(&self, sha: &str) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(parse_oid(sha)?)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path().and_then(|p| p.to_str()) {
                    if !paths.iter().any(|known: &String| known == path) {
                        paths.push(path.to_string());
                    }
                }
            }
        }
        Ok(paths)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let when = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        commit.parent_ids().map(|oid| oid.to_string()).collect(),
        when,
        commit.message().unwrap_or("").to_string(),
    )
}
