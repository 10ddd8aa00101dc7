//! Candidate exclusion from the `ignore` configuration

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{info, warn};

use branchver_core::error::Result;
use branchver_core::IgnoreConfiguration;
use branchver_git::RepositoryProvider;

use crate::types::BaseVersion;

/// Decides whether a base version candidate is dropped
pub trait VersionFilter: Send + Sync {
    /// `Some(reason)` when the candidate must be excluded
    fn exclude(&self, version: &BaseVersion, repo: &dyn RepositoryProvider) -> Result<Option<String>>;
}

/// Drops candidates sourced before an instant
pub struct MinDateFilter {
    min: DateTime<Utc>,
}

impl MinDateFilter {
    pub fn new(min: DateTime<Utc>) -> Self {
        Self { min }
    }
}

impl VersionFilter for MinDateFilter {
    fn exclude(&self, version: &BaseVersion, _repo: &dyn RepositoryProvider) -> Result<Option<String>> {
        Ok(version
            .base_version_source
            .as_ref()
            .filter(|source| source.when < self.min)
            .map(|source| {
                format!(
                    "Source {} was committed before {}",
                    source.short_sha,
                    self.min.to_rfc3339()
                )
            }))
    }
}

/// Drops candidates sourced at listed commits (prefix match)
pub struct ShaFilter {
    shas: Vec<String>,
}

impl ShaFilter {
    pub fn new(shas: Vec<String>) -> Self {
        Self { shas }
    }
}

impl VersionFilter for ShaFilter {
    fn exclude(&self, version: &BaseVersion, _repo: &dyn RepositoryProvider) -> Result<Option<String>> {
        let Some(source) = version.source_sha() else {
            return Ok(None);
        };
        Ok(self
            .shas
            .iter()
            .find(|sha| !sha.is_empty() && source.starts_with(sha.as_str()))
            .map(|sha| format!("Source {source} matches ignored sha {sha}")))
    }
}

/// Drops candidates whose source commit touches an ignored path
pub struct PathFilter {
    globs: GlobSet,
}

impl PathFilter {
    /// Invalid globs are skipped with a warning
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(pattern, error = %e, "ignoring invalid path glob"),
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "path globs could not be compiled");
            GlobSet::empty()
        });
        Self { globs }
    }
}

impl VersionFilter for PathFilter {
    fn exclude(&self, version: &BaseVersion, repo: &dyn RepositoryProvider) -> Result<Option<String>> {
        let Some(source) = version.source_sha() else {
            return Ok(None);
        };
        if self.globs.is_empty() {
            return Ok(None);
        }
        Ok(repo
            .changed_paths(source)?
            .into_iter()
            .find(|path| self.globs.is_match(path))
            .map(|path| format!("Source {source} touches ignored path {path}")))
    }
}

/// Filters configured by `ignore`
pub fn filters_for(ignore: &IgnoreConfiguration) -> Vec<Box<dyn VersionFilter>> {
    let mut filters: Vec<Box<dyn VersionFilter>> = Vec::new();
    if let Some(min) = ignore.commits_before {
        filters.push(Box::new(MinDateFilter::new(min)));
    }
    if !ignore.shas.is_empty() {
        filters.push(Box::new(ShaFilter::new(ignore.shas.clone())));
    }
    if !ignore.paths.is_empty() {
        filters.push(Box::new(PathFilter::new(&ignore.paths)));
    }
    filters
}

/// Keep the candidates no filter excludes; candidates without a source are always kept
pub fn apply_filters(
    candidates: Vec<BaseVersion>,
    filters: &[Box<dyn VersionFilter>],
    repo: &dyn RepositoryProvider,
) -> Result<Vec<BaseVersion>> {
    let mut kept = Vec::with_capacity(candidates.len());
    'candidates: for candidate in candidates {
        for filter in filters {
            if let Some(reason) = filter.exclude(&candidate, repo)? {
                info!(candidate = %candidate, reason, "excluding base version");
                continue 'candidates;
            }
        }
        kept.push(candidate);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::VersionStrategyKind;
    use branchver_git::MemoryRepository;

    use crate::version::SemanticVersion;

    fn candidate(repo: &MemoryRepository, sha: Option<&str>) -> BaseVersion {
        BaseVersion::new(
            VersionStrategyKind::TaggedCommit,
            "test",
            true,
            SemanticVersion::new(1, 0, 0),
            sha.map(|s| repo.commit(s).unwrap()),
        )
    }

    #[test]
    fn test_sha_prefix() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit_on("main", "a").unwrap();
        let b = repo.commit_on("main", "b").unwrap();
        let filters = filters_for(&IgnoreConfiguration {
            shas: vec![a[..8].to_string()],
            ..Default::default()
        });

        let kept = apply_filters(
            vec![candidate(&repo, Some(&a)), candidate(&repo, Some(&b)), candidate(&repo, None)],
            &filters,
            &repo,
        )
        .unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source_sha(), Some(b.as_str()));
        assert!(kept[1].base_version_source.is_none());
    }

    #[test]
    fn test_commits_before() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit_on("main", "a").unwrap();
        let b = repo.commit_on("main", "b").unwrap();
        let cutoff = repo.commit(&b).unwrap().when;
        let filters = filters_for(&IgnoreConfiguration {
            commits_before: Some(cutoff),
            ..Default::default()
        });

        let kept = apply_filters(
            vec![candidate(&repo, Some(&a)), candidate(&repo, Some(&b))],
            &filters,
            &repo,
        )
        .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_sha(), Some(b.as_str()));
    }

    #[test]
    fn test_paths() {
        let mut repo = MemoryRepository::new();
        let docs = repo.commit_with_paths("main", "docs", &["docs/readme.md"]).unwrap();
        let code = repo.commit_with_paths("main", "code", &["src/lib.rs"]).unwrap();
        let filters = filters_for(&IgnoreConfiguration {
            paths: vec!["docs/**".to_string()],
            ..Default::default()
        });

        let kept = apply_filters(
            vec![candidate(&repo, Some(&docs)), candidate(&repo, Some(&code))],
            &filters,
            &repo,
        )
        .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_sha(), Some(code.as_str()));
    }
}
