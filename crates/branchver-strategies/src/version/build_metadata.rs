//! Build metadata

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static METADATA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<count>\d+)?(\.?Branch(Name)?\.(?P<branch>[^.]+))?(\.?Sha?\.(?P<sha>[^.]+))?(?P<other>.*)$",
    )
    .expect("Invalid regex")
});

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9-]").expect("Invalid regex"));

/// Replace every character outside `[a-zA-Z0-9-]` with `-`
pub fn escape_branch_name(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "-").into_owned()
}

/// The `+...` part of a version; never affects ordering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub commits_since_tag: Option<u64>,
    pub commits_since_version_source: u64,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub short_sha: Option<String>,
    pub version_source_sha: Option<String>,
    pub commit_date: Option<DateTime<Utc>>,
    pub other_metadata: Option<String>,
}

impl BuildMetadata {
    /// Recognise `N.Branch.b.Sha.s` text; the remainder lands in `other_metadata`
    pub fn parse(text: &str) -> Self {
        let mut metadata = Self::default();
        if text.is_empty() {
            return metadata;
        }
        let Some(caps) = METADATA_REGEX.captures(text) else {
            metadata.other_metadata = Some(text.to_string());
            return metadata;
        };

        if let Some(count) = caps.name("count").and_then(|m| m.as_str().parse().ok()) {
            metadata.commits_since_tag = Some(count);
            metadata.commits_since_version_source = count;
        }
        metadata.branch = caps.name("branch").map(|m| m.as_str().to_string());
        metadata.sha = caps.name("sha").map(|m| m.as_str().to_string());
        metadata.other_metadata = caps
            .name("other")
            .map(|m| m.as_str().trim_start_matches('.').to_string())
            .filter(|other| !other.is_empty());
        metadata
    }

    /// Whether nothing would be printed by the full form
    pub fn is_empty(&self) -> bool {
        self.full().is_empty()
    }

    /// Commit count zero-padded to `padding`, empty when unset
    pub fn padded(&self, padding: usize) -> String {
        self.commits_since_tag
            .map(|count| format!("{:0width$}", count, width = padding))
            .unwrap_or_default()
    }

    /// `N.Branch.b.Sha.s.other`, skipping absent parts
    pub fn full(&self) -> String {
        let mut parts = Vec::new();
        if let Some(count) = self.commits_since_tag {
            parts.push(count.to_string());
        }
        if let Some(branch) = &self.branch {
            parts.push(format!("Branch.{}", escape_branch_name(branch)));
        }
        if let Some(sha) = &self.sha {
            parts.push(format!("Sha.{}", sha));
        }
        if let Some(other) = &self.other_metadata {
            parts.push(other.clone());
        }
        parts.join(".")
    }
}

impl fmt::Display for BuildMetadata {
    /// Short form: the commit count only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.commits_since_tag {
            Some(count) => write!(f, "{}", count),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_text() {
        let metadata = BuildMetadata::parse("5.Branch.develop.Sha.abc123");
        assert_eq!(metadata.commits_since_tag, Some(5));
        assert_eq!(metadata.branch.as_deref(), Some("develop"));
        assert_eq!(metadata.sha.as_deref(), Some("abc123"));
        assert_eq!(metadata.other_metadata, None);
    }

    #[test]
    fn test_parse_other_text() {
        let metadata = BuildMetadata::parse("build.42");
        assert_eq!(metadata.commits_since_tag, None);
        assert_eq!(metadata.other_metadata.as_deref(), Some("build.42"));

        let metadata = BuildMetadata::parse("3.exp");
        assert_eq!(metadata.commits_since_tag, Some(3));
        assert_eq!(metadata.other_metadata.as_deref(), Some("exp"));
    }

    #[test]
    fn test_full_form_escapes_branch() {
        let metadata = BuildMetadata {
            commits_since_tag: Some(2),
            branch: Some("feature/login".to_string()),
            sha: Some("deadbeef".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.full(), "2.Branch.feature-login.Sha.deadbeef");
        assert_eq!(metadata.to_string(), "2");
        assert_eq!(metadata.padded(4), "0002");
    }

    #[test]
    fn test_empty() {
        let metadata = BuildMetadata::default();
        assert!(metadata.is_empty());
        assert_eq!(metadata.padded(4), "");
    }
}
