//! Git repository operations

use std::path::{Path, PathBuf};

use git2::Repository;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use branchver_core::error::{RepositoryError, Result};

use crate::provider::RepositoryProvider;
use crate::types::{BranchInfo, CommitInfo, TagInfo};

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                RepositoryError::RepositoryNotFound(path.to_path_buf())
            } else {
                RepositoryError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        info!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                RepositoryError::NotARepository(start_path.to_path_buf())
            } else {
                RepositoryError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a reference to the inner git2 Repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Name of the checked out branch
    pub fn head_branch(&self) -> Result<String> {
        if self.repo.head_detached()? {
            return Err(RepositoryError::DetachedHead.into());
        }
        let head = self.repo.head()?;
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| RepositoryError::DetachedHead.into())
    }

    /// Full sha of the commit a revision resolves to
    pub fn resolve(&self, rev: &str) -> Result<String> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|_| RepositoryError::CommitNotFound(rev.to_string()))?;
        let commit = object.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Hash of the modification times of HEAD and the ref stores.
    ///
    /// Any ref update changes at least one mtime, which changes the fingerprint.
    pub fn fingerprint(&self) -> String {
        let git_dir = self.repo.path();
        let mut hasher = Sha256::new();
        for entry in ["HEAD", "packed-refs", "refs/heads", "refs/tags"] {
            hash_mtimes(&git_dir.join(entry), &mut hasher);
        }
        let fingerprint = format!("{:x}", hasher.finalize());
        debug!(fingerprint = %fingerprint, "repository fingerprint");
        fingerprint
    }
}

fn hash_mtimes(path: &Path, hasher: &mut Sha256) {
    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };
    hasher.update(path.to_string_lossy().as_bytes());
    if let Ok(modified) = metadata.modified() {
        if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
            hasher.update(since_epoch.as_nanos().to_le_bytes());
        }
    }
    if metadata.is_dir() {
        let Ok(entries) = std::fs::read_dir(path) else {
            return;
        };
        let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        children.sort();
        for child in children {
            hash_mtimes(&child, hasher);
        }
    }
}

impl RepositoryProvider for GitRepo {
    fn branches(&self) -> Result<Vec<BranchInfo>> {
        self.local_branches()
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        self.all_tags()
    }

    fn find_commit(&self, sha: &str) -> Result<Option<CommitInfo>> {
        self.lookup_commit(sha)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        self.walk_range(from, to)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        self.best_common_ancestor(a, b)
    }

    fn changed_paths(&self, sha: &str) -> Result<Vec<String>> {
        self.paths_touched(sha)
    }

    fn short_sha(&self, sha: &str) -> String {
        git2::Oid::from_str(sha)
            .ok()
            .and_then(|oid| self.repo.find_object(oid, None).ok())
            .and_then(|object| object.short_id().ok())
            .and_then(|buf| buf.as_str().map(str::to_string))
            .unwrap_or_else(|| sha.chars().take(crate::types::SHORT_SHA_LEN).collect())
    }
}
