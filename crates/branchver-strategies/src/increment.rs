//! Bump directives from commit messages

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use branchver_core::{CommitMessageIncrementMode, EffectiveConfiguration, VersionField};
use branchver_git::CommitInfo;

use crate::types::BaseVersion;

/// Scans commit messages for `+semver:` style directives
#[derive(Debug, Clone)]
pub struct IncrementFinder {
    major: Option<Regex>,
    minor: Option<Regex>,
    patch: Option<Regex>,
    none: Option<Regex>,
    mode: CommitMessageIncrementMode,
}

/// Strongest directive found in a set of messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    NoBump,
    Bump(VersionField),
}

fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern, error = %e, "ignoring invalid bump message regex");
            None
        }
    }
}

impl IncrementFinder {
    pub fn new(config: &EffectiveConfiguration) -> Self {
        Self {
            major: compile(&config.major_version_bump_message),
            minor: compile(&config.minor_version_bump_message),
            patch: compile(&config.patch_version_bump_message),
            none: compile(&config.no_bump_message),
            mode: config.commit_message_incrementing,
        }
    }

    fn matches(regex: &Option<Regex>, message: &str) -> bool {
        regex.as_ref().is_some_and(|r| r.is_match(message))
    }

    fn directive(&self, message: &str) -> Option<Directive> {
        if Self::matches(&self.major, message) {
            Some(Directive::Bump(VersionField::Major))
        } else if Self::matches(&self.minor, message) {
            Some(Directive::Bump(VersionField::Minor))
        } else if Self::matches(&self.patch, message) {
            Some(Directive::Bump(VersionField::Patch))
        } else if Self::matches(&self.none, message) {
            Some(Directive::NoBump)
        } else {
            None
        }
    }

    /// Bump requested by a single message
    pub fn message_increment(&self, message: &str) -> Option<VersionField> {
        match self.directive(message)? {
            Directive::Bump(field) => Some(field),
            Directive::NoBump => Some(VersionField::None),
        }
    }

    fn strongest<'c>(&self, commits: impl IntoIterator<Item = &'c CommitInfo>) -> Option<Directive> {
        if self.mode == CommitMessageIncrementMode::Disabled {
            return None;
        }
        commits
            .into_iter()
            .filter(|c| self.mode != CommitMessageIncrementMode::MergeMessageOnly || c.is_merge())
            .filter_map(|c| self.directive(&c.message))
            .fold(None, |best, found| match (best, found) {
                (None, found) => Some(found),
                (Some(Directive::NoBump), found) => Some(found),
                (Some(Directive::Bump(a)), Directive::Bump(b)) => Some(Directive::Bump(a.max(b))),
                (Some(bump), Directive::NoBump) => Some(bump),
            })
    }

    /// Strongest bump across `commits`; a lone no-bump directive yields `VersionField::None`
    pub fn commits_increment<'c>(
        &self,
        commits: impl IntoIterator<Item = &'c CommitInfo>,
    ) -> Option<VersionField> {
        match self.strongest(commits)? {
            Directive::Bump(field) => Some(field),
            Directive::NoBump => Some(VersionField::None),
        }
    }

    /// Combine message directives in `commits` with the branch default.
    ///
    /// Messages can raise the default but not lower it; a no-bump directive
    /// alone suppresses it. Capped at `Minor` below 1.0.0.
    pub fn determine_increment(
        &self,
        base: &BaseVersion,
        commits: &[CommitInfo],
        default: VersionField,
    ) -> VersionField {
        let default = if base.should_increment {
            default
        } else {
            VersionField::None
        };

        let field = match self.strongest(commits) {
            None => default,
            Some(Directive::NoBump) => VersionField::None,
            Some(Directive::Bump(found)) => found.max(default),
        };

        let capped = if base.semantic_version.major == 0 && field == VersionField::Major {
            VersionField::Minor
        } else {
            field
        };
        debug!(base = %base.semantic_version, increment = %capped, "determined increment");
        capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::git_flow;
    use branchver_core::{IncrementStrategy, VersionStrategyKind};
    use chrono::Utc;

    use crate::version::SemanticVersion;

    fn effective() -> EffectiveConfiguration {
        let config = git_flow();
        let branch = config.branch_configuration_for("main");
        EffectiveConfiguration::new(&config, Some("main"), &branch, IncrementStrategy::Patch)
    }

    fn commit(message: &str) -> CommitInfo {
        CommitInfo::new(format!("{:040}", message.len()), vec![], Utc::now(), message)
    }

    fn merge(message: &str) -> CommitInfo {
        CommitInfo::new("m", vec!["a".into(), "b".into()], Utc::now(), message)
    }

    fn base(version: &str, should_increment: bool) -> BaseVersion {
        BaseVersion::new(
            VersionStrategyKind::TaggedCommit,
            "test",
            should_increment,
            version.parse::<SemanticVersion>().unwrap(),
            None,
        )
    }

    #[test]
    fn test_message_forces_major() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("fix stuff"), commit("rework api +semver: major")];
        assert_eq!(
            finder.determine_increment(&base("1.2.3", true), &commits, VersionField::Patch),
            VersionField::Major
        );
    }

    #[test]
    fn test_weaker_message_does_not_lower_default() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("+semver: patch")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", true), &commits, VersionField::Minor),
            VersionField::Minor
        );
    }

    #[test]
    fn test_no_match_respects_should_increment() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("plain")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", true), &commits, VersionField::Patch),
            VersionField::Patch
        );
        assert_eq!(
            finder.determine_increment(&base("1.0.0", false), &commits, VersionField::Patch),
            VersionField::None
        );
    }

    #[test]
    fn test_explicit_message_applies_without_should_increment() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("+semver: minor")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", false), &commits, VersionField::Patch),
            VersionField::Minor
        );
    }

    #[test]
    fn test_no_bump_alone_suppresses_default() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("docs +semver: skip")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", true), &commits, VersionField::Minor),
            VersionField::None
        );

        let commits = vec![commit("+semver: skip"), commit("+semver: FEATURE")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", true), &commits, VersionField::Patch),
            VersionField::Minor
        );
    }

    #[test]
    fn test_major_capped_before_one_dot_oh() {
        let finder = IncrementFinder::new(&effective());
        let commits = vec![commit("+semver: breaking")];
        assert_eq!(
            finder.determine_increment(&base("0.4.0", true), &commits, VersionField::Patch),
            VersionField::Minor
        );
    }

    #[test]
    fn test_disabled_and_merge_only_modes() {
        let mut config = effective();
        config.commit_message_incrementing = CommitMessageIncrementMode::Disabled;
        let finder = IncrementFinder::new(&config);
        let commits = vec![commit("+semver: major")];
        assert_eq!(
            finder.determine_increment(&base("1.0.0", true), &commits, VersionField::Patch),
            VersionField::Patch
        );

        config.commit_message_incrementing = CommitMessageIncrementMode::MergeMessageOnly;
        let finder = IncrementFinder::new(&config);
        assert_eq!(finder.commits_increment(&commits), None);
        let merges = vec![merge("Merge pull request #3 +semver: minor")];
        assert_eq!(finder.commits_increment(&merges), Some(VersionField::Minor));
    }
}
