//! Branch name helpers: embedded versions and label expansion

use regex::Regex;
use tracing::trace;

use branchver_core::SemanticVersionFormat;

use crate::version::{escape_branch_name, SemanticVersion};

/// Version embedded in a branch name and the name without it
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNameVersion {
    pub version: SemanticVersion,
    pub name_without_version: String,
}

/// Find the version in `branch_name` using a pattern with a `version` group.
///
/// Each `/`-separated segment is tried in order; the first match wins.
pub fn version_in_branch_name(
    pattern: &str,
    tag_prefix: &str,
    branch_name: &str,
) -> Option<BranchNameVersion> {
    let regex = Regex::new(pattern).ok()?;
    for segment in branch_name.split('/') {
        let Some(found) = regex.captures(segment).and_then(|caps| caps.name("version")) else {
            continue;
        };
        let text = found.as_str();
        let Some(version) =
            SemanticVersion::try_parse(text, Some(tag_prefix), SemanticVersionFormat::Loose)
        else {
            continue;
        };

        let name_without_version = Regex::new(&format!("[-/]{}", regex::escape(text)))
            .map(|strip| strip.replace(branch_name, "").into_owned())
            .unwrap_or_else(|_| branch_name.to_string());
        trace!(branch_name, version = %version, "version in branch name");
        return Some(BranchNameVersion {
            version,
            name_without_version,
        });
    }
    None
}

/// Expand `{group}` placeholders in a label.
///
/// The (overridden) branch name is escaped and matched against the branch
/// regex; each named group replaces its placeholder. A leftover
/// `{BranchName}` becomes the escaped name.
pub fn expand_label(
    label: &str,
    branch_regex: Option<&str>,
    branch_name: &str,
    branch_name_override: Option<&str>,
) -> String {
    let name = escape_branch_name(branch_name_override.unwrap_or(branch_name));
    let mut expanded = label.to_string();

    if let Some(regex) = branch_regex.and_then(|pattern| Regex::new(pattern).ok()) {
        if let Some(caps) = regex.captures(&name) {
            for group in regex.capture_names().flatten() {
                let value = caps.name(group).map(|m| m.as_str()).unwrap_or("");
                expanded = expanded.replace(&format!("{{{}}}", group), value);
            }
        }
    }

    expanded.replace("{BranchName}", &name)
}

/// Number matched by a pattern with a `number` group, e.g. a pull request id
pub fn label_number(pattern: &str, branch_name: &str) -> Option<u64> {
    let regex = Regex::new(pattern).ok()?;
    regex
        .captures(branch_name)
        .and_then(|caps| caps.name("number"))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = r"(?P<version>[vV]?\d+(\.\d+)?(\.\d+)?).*";

    #[test]
    fn test_version_in_release_branch() {
        let found = version_in_branch_name(PATTERN, "[vV]?", "release/2.0.0").unwrap();
        assert_eq!(found.version, SemanticVersion::new(2, 0, 0));
        assert_eq!(found.name_without_version, "release");

        let found = version_in_branch_name(PATTERN, "[vV]?", "release-v1.3").unwrap();
        assert_eq!(found.version, SemanticVersion::new(1, 3, 0));
        assert_eq!(found.name_without_version, "release");
    }

    #[test]
    fn test_no_version_in_branch() {
        assert!(version_in_branch_name(PATTERN, "[vV]?", "release/next").is_none());
    }

    #[test]
    fn test_expand_label() {
        let feature = "^features?[/-](?P<BranchName>.+)";
        assert_eq!(expand_label("{BranchName}", Some(feature), "feature/login", None), "login");
        assert_eq!(expand_label("beta", Some(feature), "feature/login", None), "beta");
        assert_eq!(
            expand_label("{BranchName}", Some("^main$"), "topic/a_b", None),
            "topic-a-b"
        );
        assert_eq!(
            expand_label("pre-{BranchName}", None, "release/1.0", Some("release")),
            "pre-release"
        );
    }

    #[test]
    fn test_label_number() {
        let pattern = r"[/-](?P<number>\d+)";
        assert_eq!(label_number(pattern, "pull/42/merge"), Some(42));
        assert_eq!(label_number(pattern, "pull-request"), None);
    }
}
