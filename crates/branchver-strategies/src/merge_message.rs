//! Merge commit message parsing

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use branchver_core::GitVersionConfiguration;

use crate::branch_name::version_in_branch_name;
use crate::version::SemanticVersion;

/// Built-in merge message formats, tried in this order after custom ones
static BUILTIN_FORMATS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "Default",
            r"^Merge (branch|tag) '(?P<SourceBranch>[^']*)'(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "SmartGit",
            r"^Finish (?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "BitBucketPull",
            r"^Merge pull request #(?P<PullRequestNumber>\d+) (from|in) (?P<Source>.*) from (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
        ),
        (
            "BitBucketPullv7",
            r"^Pull request #(?P<PullRequestNumber>\d+).*\r?\n\r?\nMerge in (?P<Source>.*) from (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
        ),
        (
            "GitHubPull",
            r"^Merge pull request #(?P<PullRequestNumber>\d+) (from|in) (?:[^\s/]+/)?(?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "RemoteTracking",
            r"^Merge remote-tracking branch '(?P<SourceBranch>[^\s]*)'(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "AzureDevOpsPull",
            r"^Merge pull request (?P<PullRequestNumber>\d+) from (?P<SourceBranch>[^\s]*) into (?P<TargetBranch>[^\s]*)",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("Invalid regex")))
    .collect()
});

const REMOTE_PREFIXES: &[&str] = &["refs/heads/", "refs/remotes/", "remotes/", "origin/"];

/// What a merge commit message says about the merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeMessage {
    pub format_name: String,
    pub merged_branch: String,
    pub target_branch: Option<String>,
    pub pull_request_number: Option<u64>,
    /// Version named by the merged branch
    pub version: Option<SemanticVersion>,
}

impl MergeMessage {
    /// Parse with custom formats first, then the built-in ones
    pub fn parse(message: &str, config: &GitVersionConfiguration) -> Option<Self> {
        let custom: Vec<(String, Regex)> = config
            .merge_message_formats
            .iter()
            .filter_map(|(name, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some((name.clone(), regex)),
                Err(e) => {
                    warn!(format = %name, error = %e, "ignoring invalid merge message format");
                    None
                }
            })
            .collect();

        let formats = custom.iter().map(|(name, regex)| (name.as_str(), regex)).chain(
            BUILTIN_FORMATS
                .iter()
                .map(|(name, regex)| (*name, regex)),
        );

        for (name, regex) in formats {
            let Some(caps) = regex.captures(message) else {
                continue;
            };
            let Some(source) = caps.name("SourceBranch") else {
                continue;
            };
            let merged_branch = strip_remote(source.as_str());
            let version = version_in_branch_name(
                &config.version_in_branch_pattern,
                &config.tag_prefix,
                &merged_branch,
            )
            .map(|found| found.version);

            return Some(Self {
                format_name: name.to_string(),
                merged_branch,
                target_branch: caps.name("TargetBranch").map(|m| m.as_str().to_string()),
                pull_request_number: caps
                    .name("PullRequestNumber")
                    .and_then(|m| m.as_str().parse().ok()),
                version,
            });
        }
        None
    }
}

fn strip_remote(name: &str) -> String {
    let mut stripped = name;
    for prefix in REMOTE_PREFIXES {
        if let Some(rest) = stripped.strip_prefix(prefix) {
            stripped = rest;
        }
    }
    stripped.to_string()
}
