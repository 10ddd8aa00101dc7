//! Memoization of whole calculations
//!
//! The cache is an explicit object owned by the caller. Entries are keyed by
//! repository directory, the sha being versioned and a fingerprint of the
//! repository's ref state; a new fingerprint discards every entry.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, instrument};

use branchver_core::error::Result;
use branchver_core::GitVersionConfiguration;
use branchver_git::RepositoryProvider;

use crate::engine::{calculate_version, resolve_branch, CalculationRequest};
use crate::variables::VersionVariables;

/// Identity of one cached calculation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub directory: PathBuf,
    pub tip_sha: String,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(
        directory: impl Into<PathBuf>,
        tip_sha: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            tip_sha: tip_sha.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// Calculated variables by key
#[derive(Debug, Default)]
pub struct VersionCache {
    fingerprint: Option<String>,
    entries: HashMap<CacheKey, VersionVariables>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&VersionVariables> {
        self.entries.get(key)
    }

    /// Store an entry, dropping everything cached under another fingerprint
    pub fn insert(&mut self, key: CacheKey, variables: VersionVariables) {
        self.observe(&key.fingerprint);
        self.entries.insert(key, variables);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.fingerprint = None;
    }

    fn observe(&mut self, fingerprint: &str) {
        if self.fingerprint.as_deref() == Some(fingerprint) {
            return;
        }
        if !self.entries.is_empty() {
            debug!(dropped = self.entries.len(), "repository changed, clearing version cache");
        }
        self.entries.clear();
        self.fingerprint = Some(fingerprint.to_string());
    }
}

/// [`calculate_version`] through `cache`.
///
/// The key's tip sha is replaced by the commit `request` resolves to.
#[instrument(skip_all, fields(branch = %request.branch))]
pub fn calculate_cached(
    cache: &mut VersionCache,
    mut key: CacheKey,
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    request: &CalculationRequest,
) -> Result<VersionVariables> {
    let tip_sha = match &request.commit {
        Some(sha) => repo.commit(sha)?.sha,
        None => resolve_branch(repo, request)?.tip_sha,
    };
    if key.tip_sha != tip_sha {
        debug!(given = %key.tip_sha, resolved = %tip_sha, "cache key tip does not match request");
        key.tip_sha = tip_sha;
    }

    cache.observe(&key.fingerprint);
    if let Some(hit) = cache.get(&key) {
        debug!("version cache hit");
        return Ok(hit.clone());
    }

    let variables = calculate_version(repo, config, request)?;
    cache.insert(key, variables.clone());
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::git_flow;
    use branchver_git::MemoryRepository;

    #[test]
    fn test_hit_and_invalidation() {
        let mut repo = MemoryRepository::new();
        let tip = repo.commit_on("main", "one").unwrap();
        let config = git_flow();
        let request = CalculationRequest::new("main");
        let mut cache = VersionCache::new();

        let key = CacheKey::new("/repo", tip.clone(), "fp-1");
        let first = calculate_cached(&mut cache, key.clone(), &repo, &config, &request).unwrap();
        assert_eq!(cache.len(), 1);

        let again = calculate_cached(&mut cache, key, &repo, &config, &request).unwrap();
        assert_eq!(first, again);
        assert_eq!(cache.len(), 1);

        let changed = CacheKey::new("/repo", tip, "fp-2");
        let fresh = calculate_cached(&mut cache, changed, &repo, &config, &request).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_stale_key_misses_after_branch_moves() {
        let mut repo = MemoryRepository::new();
        let old_tip = repo.commit_on("main", "one").unwrap();
        let config = git_flow();
        let request = CalculationRequest::new("main");
        let mut cache = VersionCache::new();

        let key = CacheKey::new("/repo", old_tip.clone(), "fp-1");
        let first = calculate_cached(&mut cache, key.clone(), &repo, &config, &request).unwrap();

        let new_tip = repo.commit_on("main", "two").unwrap();
        let second = calculate_cached(&mut cache, key, &repo, &config, &request).unwrap();
        assert_ne!(first.get("Sha"), second.get("Sha"));
        assert_eq!(second.get("Sha"), Some(new_tip.as_str()));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&CacheKey::new("/repo", new_tip, "fp-1")).is_some());
        assert_eq!(cache.get(&CacheKey::new("/repo", old_tip, "fp-1")), Some(&first));
    }

    #[test]
    fn test_commit_request_is_keyed_by_that_commit() {
        let mut repo = MemoryRepository::new();
        let one = repo.commit_on("main", "one").unwrap();
        repo.commit_on("main", "two").unwrap();
        let config = git_flow();
        let request = CalculationRequest::new("main").at_commit(one.clone());
        let mut cache = VersionCache::new();

        let key = CacheKey::new("/repo", "unrelated", "fp-1");
        let variables = calculate_cached(&mut cache, key, &repo, &config, &request).unwrap();
        assert_eq!(variables.get("Sha"), Some(one.as_str()));
        assert!(cache.get(&CacheKey::new("/repo", one, "fp-1")).is_some());
    }

    #[test]
    fn test_insert_under_new_fingerprint_clears() {
        let mut cache = VersionCache::new();
        cache.insert(CacheKey::new("/a", "1", "x"), VersionVariables::default());
        cache.insert(CacheKey::new("/b", "2", "x"), VersionVariables::default());
        assert_eq!(cache.len(), 2);

        cache.insert(CacheKey::new("/a", "3", "y"), VersionVariables::default());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::new("/a", "1", "x")).is_none());
    }
}
