//! Historical version markers

use chrono::{DateTime, Utc};

use crate::context::GitVersionContext;
use crate::merge_message::MergeMessage;
use crate::version::SemanticVersion;

/// Where in history a version was released
#[derive(Debug, Clone, PartialEq)]
pub struct VersionPoint {
    pub major: u64,
    pub minor: u64,
    pub timestamp: DateTime<Utc>,
    pub commit_sha: String,
    pub version: SemanticVersion,
}

impl VersionPoint {
    fn new(version: SemanticVersion, timestamp: DateTime<Utc>, commit_sha: &str) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            timestamp,
            commit_sha: commit_sha.to_string(),
            version,
        }
    }
}

/// Points from reachable version tags and release branch merges, newest first
pub fn collect_version_points(ctx: &GitVersionContext<'_>) -> Vec<VersionPoint> {
    let mut points: Vec<VersionPoint> = ctx
        .tagged_versions()
        .iter()
        .map(|tagged| VersionPoint::new(tagged.version.clone(), tagged.commit.when, &tagged.commit.sha))
        .collect();

    for commit in ctx.history().iter().filter(|c| c.is_merge()) {
        let Some(merge) = MergeMessage::parse(&commit.message, ctx.config) else {
            continue;
        };
        if !ctx.config.is_release_branch(&merge.merged_branch) {
            continue;
        }
        if let Some(version) = merge.version {
            points.push(VersionPoint::new(version, commit.when, &commit.sha));
        }
    }

    points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.commit_sha.cmp(&b.commit_sha)));
    points
}

/// Newest point carrying the highest tagged version
pub fn newest_point_of_highest_tag(ctx: &GitVersionContext<'_>) -> Option<VersionPoint> {
    let highest = ctx.tagged_versions().iter().map(|t| &t.version).max()?.clone();
    collect_version_points(ctx)
        .into_iter()
        .find(|point| point.version.compare_precedence(&highest).is_eq())
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::git_flow;
    use branchver_git::{BranchInfo, MemoryRepository, RepositoryProvider};

    #[test]
    fn test_points_from_tags_and_release_merges() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit_on("main", "root").unwrap();
        repo.tag("1.0.0", &root).unwrap();
        repo.branch_from("release/1.1.0", "main").unwrap();
        repo.commit_on("release/1.1.0", "stabilise").unwrap();
        let merge = repo.merge("release/1.1.0", "main").unwrap();

        let config = git_flow();
        let current = repo.commit(&merge).unwrap();
        let ctx = GitVersionContext::new(&repo, &config, BranchInfo::new("main", &merge), current)
            .unwrap();

        let points = collect_version_points(&ctx);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].commit_sha, merge);
        assert_eq!((points[0].major, points[0].minor), (1, 1));
        assert_eq!(points[1].commit_sha, root);

        let anchor = newest_point_of_highest_tag(&ctx).unwrap();
        assert_eq!(anchor.commit_sha, root);
    }
}
