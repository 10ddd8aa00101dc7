//! Mainline version replay
//!
//! Versions on mainline branches are simulated by walking the first-parent
//! history of the mainline from the newest release anchor and applying one
//! increment per direct commit and one per merged branch. Branches off the
//! mainline get a single extra increment for branching off.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use branchver_core::error::{RepositoryError, Result, TopologyError};
use branchver_core::{EffectiveConfiguration, IncrementStrategy, VersionField, VersionStrategyKind};
use branchver_git::{BranchInfo, CommitInfo};

use crate::context::GitVersionContext;
use crate::increment::IncrementFinder;
use crate::merge_message::MergeMessage;
use crate::types::BaseVersion;
use crate::version::{BuildMetadata, SemanticVersion};
use crate::version_point::{newest_point_of_highest_tag, VersionPoint};

/// Replays mainline history for one calculation
pub struct MainlineVersionCalculator<'c, 'a> {
    ctx: &'c GitVersionContext<'a>,
    config: &'c EffectiveConfiguration,
    finder: IncrementFinder,
}

impl<'c, 'a> MainlineVersionCalculator<'c, 'a> {
    pub fn new(ctx: &'c GitVersionContext<'a>, config: &'c EffectiveConfiguration) -> Self {
        Self {
            ctx,
            config,
            finder: IncrementFinder::new(config),
        }
    }

    #[instrument(skip(self), fields(branch = %self.ctx.branch.name))]
    pub fn calculate(&self) -> Result<BaseVersion> {
        let anchor = newest_point_of_highest_tag(self.ctx);
        let mut version = match &anchor {
            Some(point) if point.version.is_pre_release() => {
                return Err(TopologyError::MainlinePreRelease(point.version.to_string()).into());
            }
            Some(point) => point.version.clone(),
            None => self.fallback_version()?,
        };
        version.build_metadata = BuildMetadata::default();

        let mainline = self.find_mainline(anchor.as_ref())?;
        let on_mainline = mainline.name == self.ctx.branch.name;
        let current = &self.ctx.current_commit;
        let excluded = self.anchor_ancestors(anchor.as_ref())?;
        debug!(mainline = %mainline.name, on_mainline, "replaying mainline");

        let (tip, merge_base) = if on_mainline {
            (current.sha.clone(), None)
        } else {
            let (tip, base) = self.effective_mainline_tip(&mainline, &excluded)?;
            (tip, Some(base))
        };

        let mut direct: Vec<CommitInfo> = Vec::new();
        for commit in self.mainline_log(&tip, &excluded)? {
            direct.push(commit.clone());
            if commit.is_merge() {
                version = self.aggregate_merge(&commit, &mut direct, version, &mainline.name)?;
            }
        }
        version = self.increment_each(&direct, version, &mainline.name);

        let source = match &merge_base {
            Some(base) => {
                let branch_commits = self.ctx.repo.commits_between(Some(base), &current.sha)?;
                let increment = self
                    .finder
                    .commits_increment(&branch_commits)
                    .or_else(|| self.config.increment.to_version_field())
                    .unwrap_or(VersionField::Patch);
                debug!(%increment, "branching off mainline");
                version = version.increment(increment);
                Some(self.ctx.repo.commit(base)?)
            }
            None => match &anchor {
                Some(point) => Some(self.ctx.repo.commit(&point.commit_sha)?),
                None => self.ctx.repo.find_root(&current.sha)?,
            },
        };

        info!(version = %version, mainline = %mainline.name, "mainline version");
        Ok(BaseVersion::new(
            VersionStrategyKind::Mainline,
            format!("Mainline replay on '{}'", mainline.name),
            false,
            version,
            source,
        ))
    }

    fn fallback_version(&self) -> Result<SemanticVersion> {
        let text = &self.ctx.config.fallback_version;
        Ok(text.parse::<SemanticVersion>()?)
    }

    /// Commits reachable from the anchor; these are not replayed
    fn anchor_ancestors(&self, anchor: Option<&VersionPoint>) -> Result<HashSet<String>> {
        let Some(point) = anchor else {
            return Ok(HashSet::new());
        };
        Ok(self
            .ctx
            .repo
            .commits_between(None, &point.commit_sha)?
            .into_iter()
            .map(|c| c.sha)
            .collect())
    }

    /// First-parent history of `tip` not covered by the anchor, oldest first
    fn mainline_log(&self, tip: &str, excluded: &HashSet<String>) -> Result<Vec<CommitInfo>> {
        let mut log: Vec<CommitInfo> = self
            .ctx
            .repo
            .first_parent_chain(tip, None)?
            .into_iter()
            .take_while(|c| !excluded.contains(&c.sha))
            .collect();
        log.reverse();
        Ok(log)
    }

    /// Pick the mainline among reachable main branches
    fn find_mainline(&self, anchor: Option<&VersionPoint>) -> Result<BranchInfo> {
        let repo = self.ctx.repo;
        let current = &self.ctx.current_commit.sha;

        let mut groups: Vec<(String, Vec<BranchInfo>)> = Vec::new();
        for branch in repo.branches()? {
            if !self.ctx.config.is_main_branch(&branch.name) {
                continue;
            }
            let Some(base) = repo.merge_base(&branch.tip_sha, current)? else {
                continue;
            };
            match groups.iter_mut().find(|(sha, _)| *sha == base) {
                Some((_, members)) => members.push(branch),
                None => groups.push((base, vec![branch])),
            }
        }

        let closest = self
            .ctx
            .history()
            .iter()
            .find_map(|commit| groups.iter().find(|(sha, _)| *sha == commit.sha))
            .map(|(_, members)| members.clone())
            .unwrap_or_default();

        if closest.len() <= 1 {
            return closest
                .into_iter()
                .next()
                .ok_or_else(|| RepositoryError::NoMainline(self.ctx.branch.name.clone()).into());
        }

        if let Some(own) = closest.iter().find(|b| b.name == self.ctx.branch.name) {
            return Ok(own.clone());
        }
        if let Some(point) = anchor {
            for branch in &closest {
                let chain = repo.first_parent_chain(&branch.tip_sha, None)?;
                if chain.iter().any(|c| c.sha == point.commit_sha) {
                    return Ok(branch.clone());
                }
            }
        }
        Ok(closest[0].clone())
    }

    /// Mainline commit that brought the branch's merge base in, and the merge base
    fn effective_mainline_tip(
        &self,
        mainline: &BranchInfo,
        excluded: &HashSet<String>,
    ) -> Result<(String, String)> {
        let repo = self.ctx.repo;
        let current = &self.ctx.current_commit.sha;
        let no_mainline = || RepositoryError::NoMainline(self.ctx.branch.name.clone());

        let mut merge_base = repo
            .merge_base(current, &mainline.tip_sha)?
            .ok_or_else(no_mainline)?;
        let log = self.mainline_log(&mainline.tip_sha, excluded)?;
        let mut tip = effective_tip(&log, &merge_base).unwrap_or_else(|| mainline.tip_sha.clone());

        // the mainline was merged forward into this branch
        if merge_base == *current && !log.iter().any(|c| c.sha == merge_base) {
            if let Some(previous) = repo.commit(&tip)?.first_parent().map(str::to_string) {
                info!(tip = %tip, "rewinding mainline tip before forward merge");
                merge_base = repo.merge_base(current, &previous)?.ok_or_else(no_mainline)?;
                tip = effective_tip(&log, &merge_base).unwrap_or(previous);
            }
        }
        Ok((tip, merge_base))
    }

    fn aggregate_merge(
        &self,
        merge: &CommitInfo,
        direct: &mut Vec<CommitInfo>,
        version: SemanticVersion,
        mainline: &str,
    ) -> Result<SemanticVersion> {
        if merge.parents.len() > 2 {
            return Err(TopologyError::OctopusMerge {
                sha: merge.sha.clone(),
                parents: merge.parents.len(),
            }
            .into());
        }
        let first = &merge.parents[0];
        let merged_head = &merge.parents[1];

        let repo = self.ctx.repo;
        let fork = repo.merge_base(first, merged_head)?;
        let mut merged = repo.commits_between(fork.as_deref(), merged_head)?;
        merged.push(merge.clone());

        direct.retain(|c| !merged.iter().any(|m| m.sha == c.sha));
        let merge_increment = self
            .finder
            .commits_increment(&merged)
            .unwrap_or_else(|| self.merge_message_increment(merge, mainline));

        let version = self.increment_each(direct, version, mainline);
        direct.clear();
        debug!(merge = %merge.short_sha, increment = %merge_increment, "merged branch");
        Ok(version.increment(merge_increment))
    }

    /// Increment of the branch named in the merge message, else the mainline's
    fn merge_message_increment(&self, merge: &CommitInfo, mainline: &str) -> VersionField {
        MergeMessage::parse(&merge.message, self.ctx.config)
            .and_then(|parsed| self.configured_increment(&parsed.merged_branch))
            .unwrap_or_else(|| self.default_increment(mainline))
    }

    fn increment_each(
        &self,
        commits: &[CommitInfo],
        mut version: SemanticVersion,
        mainline: &str,
    ) -> SemanticVersion {
        for commit in commits {
            let increment = self
                .finder
                .commits_increment([commit])
                .unwrap_or_else(|| self.default_increment(mainline));
            version = version.increment(increment);
        }
        version
    }

    fn configured_increment(&self, branch_name: &str) -> Option<VersionField> {
        self.ctx
            .config
            .branch_configuration_for(branch_name)
            .increment
            .filter(|increment| *increment != IncrementStrategy::Inherit)
            .and_then(IncrementStrategy::to_version_field)
    }

    fn default_increment(&self, branch_name: &str) -> VersionField {
        self.configured_increment(branch_name)
            .unwrap_or(VersionField::Patch)
    }
}

/// First log commit that is `merge_base` or has it as a parent
fn effective_tip(log: &[CommitInfo], merge_base: &str) -> Option<String> {
    log.iter()
        .find(|c| c.sha == merge_base || c.parents.iter().any(|p| p == merge_base))
        .map(|c| c.sha.clone())
}
