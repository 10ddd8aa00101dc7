//! Per-calculation repository view

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use branchver_core::error::Result;
use branchver_core::GitVersionConfiguration;
use branchver_git::{BranchInfo, CommitInfo, RepositoryProvider, TagInfo};

use crate::version::SemanticVersion;

/// A tag that parsed as a version, with its target commit
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedVersion {
    pub tag: TagInfo,
    pub version: SemanticVersion,
    pub commit: CommitInfo,
}

/// Snapshot of everything one calculation needs from the repository
///
/// History and tags are read once up front; strategies query the
/// provider only for graph questions the snapshot cannot answer.
pub struct GitVersionContext<'a> {
    pub repo: &'a dyn RepositoryProvider,
    pub config: &'a GitVersionConfiguration,
    pub branch: BranchInfo,
    pub current_commit: CommitInfo,
    history: Vec<CommitInfo>,
    reachable: HashSet<String>,
    tagged: Vec<TaggedVersion>,
}

impl<'a> GitVersionContext<'a> {
    #[instrument(skip_all, fields(branch = %branch.name))]
    pub fn new(
        repo: &'a dyn RepositoryProvider,
        config: &'a GitVersionConfiguration,
        branch: BranchInfo,
        current_commit: CommitInfo,
    ) -> Result<Self> {
        let history = repo.commits_between(None, &current_commit.sha)?;
        let reachable: HashSet<String> = history.iter().map(|c| c.sha.clone()).collect();
        let by_sha: HashMap<&str, &CommitInfo> =
            history.iter().map(|c| (c.sha.as_str(), c)).collect();

        let mut tagged = Vec::new();
        for tag in repo.tags()? {
            let Some(commit) = by_sha.get(tag.target_sha.as_str()) else {
                continue;
            };
            match parse_tag(config, &tag.name) {
                Some(version) => tagged.push(TaggedVersion {
                    tag,
                    version,
                    commit: (*commit).clone(),
                }),
                None => debug!(tag = %tag.name, "skipping tag that is not a version"),
            }
        }

        debug!(
            commits = history.len(),
            tags = tagged.len(),
            "loaded repository snapshot"
        );
        Ok(Self {
            repo,
            config,
            branch,
            current_commit,
            history,
            reachable,
            tagged,
        })
    }

    /// Commits reachable from the current commit, newest first
    pub fn history(&self) -> &[CommitInfo] {
        &self.history
    }

    /// Whether `sha` is reachable from the current commit
    pub fn is_reachable(&self, sha: &str) -> bool {
        self.reachable.contains(sha)
    }

    /// Version tags on commits reachable from the current commit
    pub fn tagged_versions(&self) -> &[TaggedVersion] {
        &self.tagged
    }

    /// Version tags on the current commit
    pub fn current_commit_tags(&self) -> impl Iterator<Item = &TaggedVersion> {
        self.tagged
            .iter()
            .filter(|t| t.commit.sha == self.current_commit.sha)
    }

    pub fn is_current_commit_tagged(&self) -> bool {
        self.current_commit_tags().next().is_some()
    }

    /// Commits in `(from, current]`, newest first
    pub fn commits_since(&self, from: Option<&str>) -> Result<Vec<CommitInfo>> {
        self.repo.commits_between(from, &self.current_commit.sha)
    }

    /// Parse a tag name with the configured prefix and format
    pub fn parse_tag(&self, name: &str) -> Option<SemanticVersion> {
        parse_tag(self.config, name)
    }

    /// Version tags on commits reachable from `tip` (any tag, not only reachable ones)
    pub fn tagged_versions_from(&self, tip: &str) -> Result<Vec<TaggedVersion>> {
        let mut found = Vec::new();
        for tag in self.repo.tags()? {
            if !self.repo.is_ancestor(&tag.target_sha, tip)? {
                continue;
            }
            let Some(version) = self.parse_tag(&tag.name) else {
                continue;
            };
            let commit = self.repo.commit(&tag.target_sha)?;
            found.push(TaggedVersion {
                tag,
                version,
                commit,
            });
        }
        Ok(found)
    }
}

fn parse_tag(config: &GitVersionConfiguration, name: &str) -> Option<SemanticVersion> {
    SemanticVersion::try_parse(
        name,
        Some(config.tag_prefix.as_str()),
        config.semantic_version_format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_git::MemoryRepository;

    #[test]
    fn test_snapshot_keeps_reachable_version_tags() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit_on("main", "a").unwrap();
        repo.tag("v1.0.0", &a).unwrap();
        repo.tag("nightly", &a).unwrap();
        repo.branch_from("other", &a).unwrap();
        let b = repo.commit_on("other", "b").unwrap();
        repo.tag("v9.0.0", &b).unwrap();
        let c = repo.commit_on("main", "c").unwrap();

        let config = GitVersionConfiguration::default();
        let current = repo.commit(&c).unwrap();
        let ctx =
            GitVersionContext::new(&repo, &config, BranchInfo::new("main", &c), current).unwrap();

        let names: Vec<_> = ctx.tagged_versions().iter().map(|t| t.tag.name.as_str()).collect();
        assert_eq!(names, vec!["v1.0.0"]);
        assert!(!ctx.is_current_commit_tagged());
        assert!(ctx.is_reachable(&a));
        assert!(!ctx.is_reachable(&b));
        assert_eq!(ctx.history().len(), 2);

        let from_other = ctx.tagged_versions_from(&b).unwrap();
        assert_eq!(from_other.len(), 2);
    }
}
