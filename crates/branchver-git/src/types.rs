//! Git types

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of abbreviated commit ids
pub const SHORT_SHA_LEN: usize = 7;

/// Immutable commit record addressed by sha
///
/// Equality and hashing use the sha only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub sha: String,
    /// Short hash
    pub short_sha: String,
    /// Parent hashes, first parent first
    pub parents: Vec<String>,
    /// Committer timestamp
    pub when: DateTime<Utc>,
    /// Full commit message
    pub message: String,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(
        sha: impl Into<String>,
        parents: Vec<String>,
        when: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        let sha = sha.into();
        let short_sha = sha.chars().take(SHORT_SHA_LEN).collect();

        Self {
            sha,
            short_sha,
            parents,
            when,
            message: message.into(),
        }
    }

    /// Whether the commit has more than one parent
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Whether the commit has no parents
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First parent, if any
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

impl PartialEq for CommitInfo {
    fn eq(&self, other: &Self) -> bool {
        self.sha == other.sha
    }
}

impl Eq for CommitInfo {}

impl Hash for CommitInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sha.hash(state);
    }
}

/// A local branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Friendly branch name (e.g. `release/1.0`)
    pub name: String,
    /// Commit at the tip of the branch
    pub tip_sha: String,
}

impl BranchInfo {
    /// Create a new BranchInfo
    pub fn new(name: impl Into<String>, tip_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tip_sha: tip_sha.into(),
        }
    }
}

/// A tag peeled to the commit it targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name without `refs/tags/`
    pub name: String,
    /// Commit the tag points to
    pub target_sha: String,
    /// Tagger time for annotated tags, commit time otherwise
    pub timestamp: DateTime<Utc>,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(
        name: impl Into<String>,
        target_sha: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            target_sha: target_sha.into(),
            timestamp,
        }
    }
}
