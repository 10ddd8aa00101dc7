//! Version calculation entry point

use tracing::{debug, info, instrument};

use branchver_core::error::{RepositoryError, Result};
use branchver_core::{EffectiveConfiguration, GitVersionConfiguration};
use branchver_git::{BranchInfo, CommitInfo, RepositoryProvider};

use crate::branch_name::expand_label;
use crate::calculator::NextVersionCalculator;
use crate::context::GitVersionContext;
use crate::effective::{describe_sources, resolve_effective_configurations};
use crate::types::BaseVersion;
use crate::variables::{finalize_version, VersionVariables};
use crate::version::{BuildMetadata, PreReleaseTag, SemanticVersion};

/// What to calculate a version for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    /// Branch name; need not exist when `commit` is given
    pub branch: String,
    /// Commit to version instead of the branch tip
    pub commit: Option<String>,
}

impl CalculationRequest {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            commit: None,
        }
    }

    /// Version `sha` instead of the branch tip
    pub fn at_commit(mut self, sha: impl Into<String>) -> Self {
        self.commit = Some(sha.into());
        self
    }
}

/// A finished calculation
#[derive(Debug, Clone)]
pub struct VersionCalculation {
    /// Final version, metadata included
    pub version: SemanticVersion,
    /// Winning base version; `None` when the current commit's tag was taken verbatim
    pub base: Option<BaseVersion>,
    pub configuration: EffectiveConfiguration,
    pub variables: VersionVariables,
}

/// Calculate the output variables for a branch or commit
pub fn calculate_version(
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    request: &CalculationRequest,
) -> Result<VersionVariables> {
    Ok(calculate(repo, config, request)?.variables)
}

/// Calculate and keep the intermediate results
#[instrument(skip_all, fields(branch = %request.branch))]
pub fn calculate(
    repo: &dyn RepositoryProvider,
    config: &GitVersionConfiguration,
    request: &CalculationRequest,
) -> Result<VersionCalculation> {
    let branch = resolve_branch(repo, request)?;
    let current = repo.commit(request.commit.as_deref().unwrap_or(&branch.tip_sha))?;
    debug!(commit = %current.short_sha, "calculating version");

    let configurations = resolve_effective_configurations(repo, config, &branch)?;
    let Some(primary) = configurations.first() else {
        return Err(RepositoryError::NoEffectiveConfiguration {
            sources: describe_sources(config, &branch.name),
            branch: branch.name,
        }
        .into());
    };
    let primary = primary.value.clone();

    let ctx = GitVersionContext::new(repo, config, branch, current)?;

    if primary.prevent_increment_when_current_commit_tagged {
        if let Some(tagged) = ctx
            .current_commit_tags()
            .max_by(|a, b| a.version.compare_precedence(&b.version))
        {
            info!(tag = %tagged.tag.name, "current commit is tagged");
            let mut version = tagged.version.clone();
            version.build_metadata = build_metadata(&ctx, Some(&ctx.current_commit), false)?;
            let version = finalize_version(&version, &primary, true);
            let variables = VersionVariables::from_version(&version, &primary);
            return Ok(VersionCalculation {
                version,
                base: None,
                configuration: primary,
                variables,
            });
        }
    }

    let next = NextVersionCalculator::new().calculate(&ctx, &configurations)?;
    let configuration = next.configuration;
    let mut version = next.incremented;

    let label = expand_label(
        &configuration.label,
        configuration.branch_regex.as_deref(),
        &ctx.branch.name,
        next.base.branch_name_override.as_deref(),
    );
    apply_label(&ctx, &mut version, &label);

    let count_from = next.base.base_version_source.as_ref();
    version.build_metadata = build_metadata(&ctx, count_from, true)?;

    let version = finalize_version(&version, &configuration, ctx.is_current_commit_tagged());
    info!(version = %version.full_semver(), "calculated version");
    let variables = VersionVariables::from_version(&version, &configuration);
    Ok(VersionCalculation {
        version,
        base: Some(next.base),
        configuration,
        variables,
    })
}

pub(crate) fn resolve_branch(repo: &dyn RepositoryProvider, request: &CalculationRequest) -> Result<BranchInfo> {
    if let Some(branch) = repo.find_branch(&request.branch)? {
        return Ok(branch);
    }
    match &request.commit {
        Some(sha) => {
            debug!(branch = %request.branch, "branch not found, versioning the commit alone");
            Ok(BranchInfo::new(request.branch.clone(), sha.clone()))
        }
        None => Err(RepositoryError::BranchNotFound(request.branch.clone()).into()),
    }
}

/// Label the version unless it already carries the branch's label.
///
/// The number continues the highest reachable tag with the same label and
/// major.minor.patch, else starts at 1.
fn apply_label(ctx: &GitVersionContext<'_>, version: &mut SemanticVersion, label: &str) {
    if label.is_empty() {
        return;
    }
    if version.pre_release.has_tag() && version.pre_release.name.eq_ignore_ascii_case(label) {
        return;
    }

    let last = ctx
        .tagged_versions()
        .iter()
        .map(|t| &t.version)
        .filter(|v| v.same_core(version) && v.pre_release.name.eq_ignore_ascii_case(label))
        .filter_map(|v| v.pre_release.number)
        .max();
    let number = last.map_or(1, |n| n + 1);
    version.pre_release = PreReleaseTag::new(label, Some(number));
}

/// Metadata for the current commit, counting commits since `source` when asked
fn build_metadata(
    ctx: &GitVersionContext<'_>,
    source: Option<&CommitInfo>,
    count_commits: bool,
) -> Result<BuildMetadata> {
    let current = &ctx.current_commit;
    let commits = if count_commits {
        Some(ctx.commits_since(source.map(|c| c.sha.as_str()))?.len() as u64)
    } else {
        None
    };
    Ok(BuildMetadata {
        commits_since_tag: commits,
        commits_since_version_source: commits.unwrap_or(0),
        branch: Some(ctx.branch.name.clone()),
        sha: Some(current.sha.clone()),
        short_sha: Some(ctx.repo.short_sha(&current.sha)),
        version_source_sha: source.map(|c| c.sha.clone()),
        commit_date: Some(current.when),
        other_metadata: None,
    })
}
