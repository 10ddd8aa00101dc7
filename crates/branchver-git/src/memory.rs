//! In-memory commit arena
//!
//! [`MemoryRepository`] stores immutable commit records keyed by sha and
//! answers every provider query with explicit worklists. Commits get
//! deterministic shas and timestamps, so graph scenarios can be built
//! without touching the filesystem.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet, VecDeque};

use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use branchver_core::error::{RepositoryError, Result};

use crate::provider::RepositoryProvider;
use crate::types::{BranchInfo, CommitInfo, TagInfo};

/// First commit timestamp (2024-01-01T00:00:00Z)
const EPOCH_SECONDS: i64 = 1_704_067_200;

/// Seconds between two generated events
const TICK_SECONDS: i64 = 60;

/// Commit graph held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    commits: HashMap<String, CommitInfo>,
    branches: BTreeMap<String, String>,
    tags: BTreeMap<String, TagInfo>,
    changed: HashMap<String, Vec<String>>,
    ticks: i64,
}

impl MemoryRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    fn next_time(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.timestamp_opt(EPOCH_SECONDS + self.ticks * TICK_SECONDS, 0)
            .single()
            .unwrap_or_default()
    }

    /// Sha of a branch tip, tag target or (abbreviated) commit id
    pub fn resolve(&self, rev: &str) -> Option<String> {
        if let Some(tip) = self.branches.get(rev) {
            return Some(tip.clone());
        }
        if let Some(tag) = self.tags.get(rev) {
            return Some(tag.target_sha.clone());
        }
        if self.commits.contains_key(rev) {
            return Some(rev.to_string());
        }
        let mut matches = self.commits.keys().filter(|sha| sha.starts_with(rev));
        match (matches.next(), matches.next()) {
            (Some(sha), None) => Some(sha.clone()),
            _ => None,
        }
    }

    fn resolve_or_err(&self, rev: &str) -> Result<String> {
        self.resolve(rev)
            .ok_or_else(|| RepositoryError::CommitNotFound(rev.to_string()).into())
    }

    /// Tip of a branch
    pub fn tip(&self, branch: &str) -> Option<&str> {
        self.branches.get(branch).map(String::as_str)
    }

    /// Insert a commit with explicit parents and move `branch` to it.
    ///
    /// Parents are not checked, which allows modelling shallow clones.
    pub fn insert_commit(
        &mut self,
        branch: &str,
        parents: Vec<String>,
        message: &str,
        paths: &[&str],
    ) -> String {
        let when = self.next_time();
        let mut hasher = Sha256::new();
        hasher.update(self.ticks.to_le_bytes());
        hasher.update(message.as_bytes());
        for parent in &parents {
            hasher.update(parent.as_bytes());
        }
        let sha: String = format!("{:x}", hasher.finalize()).chars().take(40).collect();

        let commit = CommitInfo::new(sha.clone(), parents, when, message);
        self.commits.insert(sha.clone(), commit);
        self.changed.insert(
            sha.clone(),
            paths.iter().map(|path| path.to_string()).collect(),
        );
        self.branches.insert(branch.to_string(), sha.clone());
        debug!(branch, sha = %sha, "memory commit");
        sha
    }

    /// Commit on `branch`; the first commit of an empty repository creates it
    pub fn commit_on(&mut self, branch: &str, message: &str) -> Result<String> {
        self.commit_with_paths(branch, message, &[])
    }

    /// Commit on `branch` touching `paths`
    pub fn commit_with_paths(&mut self, branch: &str, message: &str, paths: &[&str]) -> Result<String> {
        let parents = match self.branches.get(branch) {
            Some(tip) => vec![tip.clone()],
            None if self.commits.is_empty() => Vec::new(),
            None => return Err(RepositoryError::BranchNotFound(branch.to_string()).into()),
        };
        Ok(self.insert_commit(branch, parents, message, paths))
    }

    /// Create `name` at the commit `from` resolves to
    pub fn branch_from(&mut self, name: &str, from: &str) -> Result<String> {
        let sha = self.resolve_or_err(from)?;
        self.branches.insert(name.to_string(), sha.clone());
        Ok(sha)
    }

    /// Merge `source` into `target` with git's default message
    pub fn merge(&mut self, source: &str, target: &str) -> Result<String> {
        let message = format!("Merge branch '{}' into {}", source, target);
        self.merge_with_message(source, target, &message)
    }

    /// Merge `source` into `target` with a custom message
    pub fn merge_with_message(&mut self, source: &str, target: &str, message: &str) -> Result<String> {
        self.merge_many(target, &[source], message)
    }

    /// Merge commit on `target` whose extra parents are `sources`, in order
    pub fn merge_many(&mut self, target: &str, sources: &[&str], message: &str) -> Result<String> {
        let mut parents = vec![self
            .branches
            .get(target)
            .cloned()
            .ok_or_else(|| RepositoryError::BranchNotFound(target.to_string()))?];
        for source in sources {
            parents.push(self.resolve_or_err(source)?);
        }
        Ok(self.insert_commit(target, parents, message, &[]))
    }

    /// Lightweight tag on the commit `rev` resolves to
    pub fn tag(&mut self, name: &str, rev: &str) -> Result<()> {
        let sha = self.resolve_or_err(rev)?;
        let when = self.next_time();
        self.tags
            .insert(name.to_string(), TagInfo::new(name, sha, when));
        Ok(())
    }

    /// Remove a branch, keeping its commits
    pub fn delete_branch(&mut self, name: &str) -> Result<()> {
        self.branches
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::BranchNotFound(name.to_string()).into())
    }

    /// Every commit reachable from `sha`, including itself
    fn ancestors(&self, sha: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([sha.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&current) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }
}

impl RepositoryProvider for MemoryRepository {
    fn branches(&self) -> Result<Vec<BranchInfo>> {
        Ok(self
            .branches
            .iter()
            .map(|(name, tip)| BranchInfo::new(name.clone(), tip.clone()))
            .collect())
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        Ok(self.tags.values().cloned().collect())
    }

    fn find_commit(&self, sha: &str) -> Result<Option<CommitInfo>> {
        Ok(self.commits.get(sha).cloned())
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let hidden = from.map(|sha| self.ancestors(sha)).unwrap_or_default();
        let included: HashSet<String> = self
            .ancestors(to)
            .into_iter()
            .filter(|sha| !hidden.contains(sha) && self.commits.contains_key(sha))
            .collect();

        // children count inside the range; a commit is emitted once all its children are
        let mut pending: HashMap<&str, usize> = included.iter().map(|s| (s.as_str(), 0)).collect();
        for sha in &included {
            for parent in &self.commits[sha].parents {
                if let Some(count) = pending.get_mut(parent.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut ready: BinaryHeap<(DateTime<Utc>, Reverse<&str>)> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(sha, _)| (self.commits[*sha].when, Reverse(*sha)))
            .collect();

        let mut ordered = Vec::with_capacity(included.len());
        while let Some((_, Reverse(sha))) = ready.pop() {
            let commit = &self.commits[sha];
            for parent in &commit.parents {
                if let Some(count) = pending.get_mut(parent.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        let parent_commit = &self.commits[parent.as_str()];
                        ready.push((parent_commit.when, Reverse(parent_commit.sha.as_str())));
                    }
                }
            }
            ordered.push(commit.clone());
        }
        Ok(ordered)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        let common: Vec<&String> = left.intersection(&right).collect();

        // best common ancestors are not reachable from another common ancestor
        let best = common
            .iter()
            .filter(|candidate| {
                !common.iter().any(|other| {
                    other != *candidate && self.ancestors(other).contains(candidate.as_str())
                })
            })
            .filter_map(|sha| self.commits.get(sha.as_str()))
            .max_by(|x, y| x.when.cmp(&y.when).then_with(|| y.sha.cmp(&x.sha)));

        Ok(best.map(|commit| commit.sha.clone()))
    }

    fn changed_paths(&self, sha: &str) -> Result<Vec<String>> {
        Ok(self.changed.get(sha).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shas(commits: &[CommitInfo]) -> Vec<&str> {
        commits.iter().map(|c| c.sha.as_str()).collect()
    }

    #[test]
    fn test_linear_history() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit_on("main", "a").unwrap();
        let b = repo.commit_on("main", "b").unwrap();
        let c = repo.commit_on("main", "c").unwrap();

        let all = repo.commits_between(None, &c).unwrap();
        assert_eq!(shas(&all), vec![c.as_str(), b.as_str(), a.as_str()]);

        let since_a = repo.commits_between(Some(&a), &c).unwrap();
        assert_eq!(shas(&since_a), vec![c.as_str(), b.as_str()]);
        assert!(repo.is_ancestor(&a, &c).unwrap());
        assert!(!repo.is_ancestor(&c, &a).unwrap());
    }

    #[test]
    fn test_commit_on_unknown_branch_fails() {
        let mut repo = MemoryRepository::new();
        repo.commit_on("main", "a").unwrap();
        assert!(repo.commit_on("develop", "b").is_err());
    }

    #[test]
    fn test_merge_base_and_topological_order() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "root").unwrap();
        repo.branch_from("feature", "main").unwrap();
        let f1 = repo.commit_on("feature", "f1").unwrap();
        let m1 = repo.commit_on("main", "m1").unwrap();
        let merge = repo.merge("feature", "main").unwrap();

        assert_eq!(repo.merge_base(&f1, &m1).unwrap(), Some(root.clone()));
        assert_eq!(repo.merge_base(&merge, &f1).unwrap(), Some(f1.clone()));

        let history = repo.commits_between(None, &merge).unwrap();
        assert_eq!(history.first().map(|c| c.sha.as_str()), Some(merge.as_str()));
        assert_eq!(history.last().map(|c| c.sha.as_str()), Some(root.as_str()));
        assert_eq!(history.len(), 4);
        assert!(history[0].is_merge());
    }

    #[test]
    fn test_first_parent_chain_and_root() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "root").unwrap();
        repo.branch_from("topic", "main").unwrap();
        repo.commit_on("topic", "t").unwrap();
        let m = repo.commit_on("main", "m").unwrap();
        let merge = repo.merge("topic", "main").unwrap();

        let chain = repo.first_parent_chain(&merge, None).unwrap();
        assert_eq!(shas(&chain), vec![merge.as_str(), m.as_str(), root.as_str()]);

        let root_commit = repo.find_root(&merge).unwrap().unwrap();
        assert_eq!(root_commit.sha, root);
    }

    #[test]
    fn test_shallow_history_has_no_root() {
        let mut repo = MemoryRepository::new();
        let tip = repo.insert_commit("main", vec!["0".repeat(40)], "grafted", &[]);
        assert!(repo.find_root(&tip).unwrap().is_none());
    }

    #[test]
    fn test_tags_and_resolve() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit_on("main", "a").unwrap();
        repo.tag("v1.0.0", "main").unwrap();

        assert_eq!(repo.resolve("v1.0.0"), Some(a.clone()));
        assert_eq!(repo.resolve(&a[..10]), Some(a.clone()));
        assert_eq!(repo.tags_on(&a).unwrap().len(), 1);
        assert!(repo.tag("v2", "missing").is_err());
    }

    #[test]
    fn test_deterministic_shas() {
        let build = || {
            let mut repo = MemoryRepository::new();
            repo.commit_on("main", "a").unwrap();
            repo.commit_on("main", "b").unwrap()
        };
        assert_eq!(build(), build());
    }
}
