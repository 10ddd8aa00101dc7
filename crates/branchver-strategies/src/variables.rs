//! Output variables
//!
//! The calculated version is finalised for the deployment mode and then
//! rendered into the flat name to string mapping handed to consumers.

use std::collections::BTreeMap;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use branchver_core::{AssemblyVersioningScheme, EffectiveConfiguration};

use crate::branch_name::label_number;
use crate::version::{escape_branch_name, SemanticVersion};

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Apply deployment-mode rules to a calculated version.
///
/// In continuous deployment an untagged commit always gets a label. A
/// `label-number-pattern` match on the branch is appended to the label.
/// When either applies, or mainline versioning is active, the commit count
/// since the tag becomes the pre-release number. A tagged commit keeps its
/// version as tagged.
pub fn finalize_version(
    version: &SemanticVersion,
    config: &EffectiveConfiguration,
    is_current_commit_tagged: bool,
) -> SemanticVersion {
    let mut version = version.clone();
    if is_current_commit_tagged {
        return version;
    }
    let continuous_deployment = config.is_continuous_deployment();

    if continuous_deployment && !version.pre_release.has_tag() {
        version.pre_release.name = if config.label.is_empty() {
            config.continuous_delivery_fallback_label.clone()
        } else {
            config.label.clone()
        };
    }

    let mut number_appended = false;
    if let Some(pattern) = config.label_number_pattern.as_deref() {
        if version.pre_release.has_tag() {
            if let Some(number) = version
                .build_metadata
                .branch
                .as_deref()
                .and_then(|branch| label_number(pattern, branch))
            {
                version.pre_release.name.push_str(&format!(
                    "{:0width$}",
                    number,
                    width = config.build_metadata_padding
                ));
            }
            number_appended = true;
        }
    }

    if continuous_deployment || number_appended || config.mainline {
        promote_commits_to_number(&mut version);
    }
    version
}

/// Move the commit count since the tag into the pre-release number
pub fn promote_commits_to_number(version: &mut SemanticVersion) {
    let metadata = &mut version.build_metadata;
    let Some(commits) = metadata.commits_since_tag.take() else {
        return;
    };

    match version.pre_release.number {
        // the calculated increment already counted one commit
        Some(number) => {
            version.pre_release.number = Some((number + commits).saturating_sub(1));
        }
        None => {
            version.pre_release.number = Some(commits);
            version.pre_release.promoted_from_commits = true;
        }
    }
    metadata.commits_since_version_source = commits;
    debug!(number = ?version.pre_release.number, "promoted commit count to pre-release number");
}

/// Flat mapping of variable name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionVariables {
    values: BTreeMap<String, String>,
}

impl VersionVariables {
    /// Render every variable from a finalised version
    pub fn from_version(version: &SemanticVersion, config: &EffectiveConfiguration) -> Self {
        let pre = &version.pre_release;
        let meta = &version.build_metadata;
        let has_tag = pre.has_tag();

        let tag = pre.to_string();
        let label = if has_tag { pre.name.clone() } else { String::new() };
        let nuget_tag = if has_tag {
            pre.to_legacy_string(Some(config.legacy_semver_padding))
                .to_lowercase()
        } else {
            String::new()
        };
        let nuget_version = version
            .legacy(Some(config.legacy_semver_padding))
            .to_lowercase();
        let weighted = if has_tag {
            pre.number.unwrap_or(0) + config.pre_release_weight
        } else {
            config.tag_pre_release_weight
        };
        let file_version = assembly_version(version, config.assembly_file_versioning_scheme);
        let branch = meta.branch.clone().unwrap_or_default();

        let mut values = BTreeMap::new();
        let mut set = |name: &str, value: String| {
            values.insert(name.to_string(), value);
        };

        set("Major", version.major.to_string());
        set("Minor", version.minor.to_string());
        set("Patch", version.patch.to_string());
        set("MajorMinorPatch", version.major_minor_patch());
        set("SemVer", version.semver());
        set("FullSemVer", version.full_semver());
        set("LegacySemVer", version.legacy(None));
        set("LegacySemVerPadded", version.legacy(Some(config.legacy_semver_padding)));
        set("PreReleaseTagWithDash", with_dash(&tag));
        set("PreReleaseTag", tag);
        set("PreReleaseLabelWithDash", with_dash(&label));
        set("PreReleaseLabel", label);
        set(
            "PreReleaseNumber",
            pre.number.map(|n| n.to_string()).unwrap_or_default(),
        );
        set("WeightedPreReleaseNumber", weighted.to_string());
        set("BuildMetaData", meta.to_string());
        set("BuildMetaDataPadded", meta.padded(config.build_metadata_padding));
        set("FullBuildMetaData", meta.full());
        set("InformationalVersion", version.informational());
        set(
            "AssemblySemVer",
            assembly_version(version, config.assembly_versioning_scheme),
        );
        set("AssemblySemFileVer", file_version.clone());
        set("AssemblyFileSemVer", file_version);
        set("EscapedBranchName", escape_branch_name(&branch));
        set("BranchName", branch);
        set("Sha", meta.sha.clone().unwrap_or_default());
        set("ShortSha", meta.short_sha.clone().unwrap_or_default());
        set(
            "CommitDate",
            format_commit_date(meta.commit_date, &config.commit_date_format),
        );
        set(
            "CommitsSinceVersionSource",
            meta.commits_since_version_source.to_string(),
        );
        set(
            "CommitsSinceVersionSourcePadded",
            format!(
                "{:0width$}",
                meta.commits_since_version_source,
                width = config.commits_since_version_source_padding
            ),
        );
        set(
            "VersionSourceSha",
            meta.version_source_sha.clone().unwrap_or_default(),
        );
        set("NuGetVersionV2", nuget_version.clone());
        set("NuGetVersion", nuget_version);
        set("NuGetPreReleaseTagV2", nuget_tag.clone());
        set("NuGetPreReleaseTag", nuget_tag);

        Self { values }
    }

    /// Value of one variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.values
    }
}

fn with_dash(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("-{}", value)
    }
}

fn assembly_version(version: &SemanticVersion, scheme: AssemblyVersioningScheme) -> String {
    match scheme {
        AssemblyVersioningScheme::MajorMinorPatchTag => format!(
            "{}.{}.{}.{}",
            version.major,
            version.minor,
            version.patch,
            version.pre_release.number.unwrap_or(0)
        ),
        AssemblyVersioningScheme::MajorMinorPatch => {
            format!("{}.{}.{}.0", version.major, version.minor, version.patch)
        }
        AssemblyVersioningScheme::MajorMinor => format!("{}.{}.0.0", version.major, version.minor),
        AssemblyVersioningScheme::Major => format!("{}.0.0.0", version.major),
        AssemblyVersioningScheme::None => String::new(),
    }
}

fn format_commit_date(date: Option<DateTime<Utc>>, format: &str) -> String {
    let Some(date) = date else {
        return String::new();
    };
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        warn!(format, "invalid commit-date-format, using {}", DEFAULT_DATE_FORMAT);
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    date.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchver_core::config::presets::git_flow;
    use branchver_core::{DeploymentMode, IncrementStrategy};
    use chrono::TimeZone;

    use crate::version::BuildMetadata;

    fn config_for(branch: &str, increment: IncrementStrategy) -> EffectiveConfiguration {
        let config = git_flow();
        let key = config.find_branch_key(branch).map(str::to_string);
        let merged = config.branch_configuration_for(branch);
        EffectiveConfiguration::new(&config, key.as_deref(), &merged, increment)
    }

    fn version_with_commits(text: &str, commits: u64) -> SemanticVersion {
        let mut version: SemanticVersion = text.parse().unwrap();
        version.build_metadata = BuildMetadata {
            commits_since_tag: Some(commits),
            commits_since_version_source: commits,
            branch: Some("develop".to_string()),
            sha: Some("0123456789abcdef".to_string()),
            short_sha: Some("0123456".to_string()),
            version_source_sha: Some("fedcba".to_string()),
            commit_date: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single(),
            other_metadata: None,
        };
        version
    }

    #[test]
    fn test_continuous_deployment_promotes_commit_count() {
        let mut config = config_for("develop", IncrementStrategy::Minor);
        config.deployment_mode = DeploymentMode::ContinuousDeployment;

        let fresh = finalize_version(&version_with_commits("1.1.0", 5), &config, false);
        assert_eq!(fresh.pre_release.name, "alpha");
        assert_eq!(fresh.pre_release.number, Some(5));
        assert!(fresh.pre_release.promoted_from_commits);
        assert_eq!(fresh.build_metadata.commits_since_tag, None);
        assert_eq!(fresh.build_metadata.commits_since_version_source, 5);

        let numbered = finalize_version(&version_with_commits("1.1.0-alpha.2", 5), &config, false);
        assert_eq!(numbered.pre_release.number, Some(6));
    }

    #[test]
    fn test_continuous_deployment_fallback_label() {
        let mut config = config_for("main", IncrementStrategy::Patch);
        config.deployment_mode = DeploymentMode::ContinuousDeployment;

        let version = finalize_version(&version_with_commits("1.0.1", 3), &config, false);
        assert_eq!(version.semver(), "1.0.1-ci.3");
    }

    #[test]
    fn test_tagged_commit_is_not_promoted() {
        let mut config = config_for("main", IncrementStrategy::Patch);
        config.deployment_mode = DeploymentMode::ContinuousDeployment;

        let version = finalize_version(&version_with_commits("1.0.0", 2), &config, true);
        assert_eq!(version.semver(), "1.0.0");
        assert_eq!(version.build_metadata.commits_since_tag, Some(2));
    }

    #[test]
    fn test_tagged_pre_release_keeps_its_number() {
        let mut config = config_for("main", IncrementStrategy::Patch);
        config.mainline = true;
        let mut version = version_with_commits("1.2.0-rc.2", 0);
        version.build_metadata.commits_since_tag = None;

        let version = finalize_version(&version, &config, true);
        assert_eq!(version.semver(), "1.2.0-rc.2");
        assert!(!version.pre_release.promoted_from_commits);
    }

    #[test]
    fn test_promotion_without_label_is_hidden() {
        let mut config = config_for("main", IncrementStrategy::Patch);
        config.mainline = true;

        let version = finalize_version(&version_with_commits("1.0.1", 4), &config, false);
        assert_eq!(version.pre_release.number, Some(4));
        assert_eq!(version.semver(), "1.0.1");
        assert_eq!(version.full_semver(), "1.0.1");
    }

    #[test]
    fn test_label_number_pattern() {
        let config = config_for("pull/42/merge", IncrementStrategy::Patch);
        let mut version = version_with_commits("1.0.1-PullRequest", 3);
        version.build_metadata.branch = Some("pull/42/merge".to_string());

        let version = finalize_version(&version, &config, false);
        assert_eq!(version.pre_release.name, "PullRequest0042");
        assert_eq!(version.pre_release.number, Some(3));
    }

    #[test]
    fn test_variables() {
        let config = config_for("develop", IncrementStrategy::Minor);
        let version = finalize_version(&version_with_commits("1.2.0-alpha.4", 5), &config, false);
        let variables = VersionVariables::from_version(&version, &config);

        assert_eq!(variables.get("Major"), Some("1"));
        assert_eq!(variables.get("MajorMinorPatch"), Some("1.2.0"));
        assert_eq!(variables.get("SemVer"), Some("1.2.0-alpha.4"));
        assert_eq!(variables.get("FullSemVer"), Some("1.2.0-alpha.4+5"));
        assert_eq!(variables.get("PreReleaseTagWithDash"), Some("-alpha.4"));
        assert_eq!(variables.get("PreReleaseLabel"), Some("alpha"));
        assert_eq!(variables.get("PreReleaseNumber"), Some("4"));
        assert_eq!(variables.get("WeightedPreReleaseNumber"), Some("4"));
        assert_eq!(variables.get("BuildMetaData"), Some("5"));
        assert_eq!(variables.get("BuildMetaDataPadded"), Some("0005"));
        assert_eq!(variables.get("LegacySemVerPadded"), Some("1.2.0-alpha0004"));
        assert_eq!(variables.get("NuGetVersionV2"), Some("1.2.0-alpha0004"));
        assert_eq!(variables.get("AssemblySemVer"), Some("1.2.0.0"));
        assert_eq!(variables.get("BranchName"), Some("develop"));
        assert_eq!(variables.get("CommitDate"), Some("2024-03-09"));
        assert_eq!(variables.get("CommitsSinceVersionSourcePadded"), Some("0005"));
        assert_eq!(
            variables.get("InformationalVersion"),
            Some("1.2.0-alpha.4+5.Branch.develop.Sha.0123456789abcdef")
        );
    }

    #[test]
    fn test_release_has_tag_weight() {
        let config = config_for("main", IncrementStrategy::Patch);
        let version = version_with_commits("1.0.0", 0);
        let variables = VersionVariables::from_version(&version, &config);
        assert_eq!(variables.get("WeightedPreReleaseNumber"), Some("60000"));
        assert_eq!(variables.get("PreReleaseTag"), Some(""));
        assert_eq!(variables.get("NuGetPreReleaseTag"), Some(""));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let config = config_for("main", IncrementStrategy::Patch);
        let variables = VersionVariables::from_version(&version_with_commits("1.0.0", 0), &config);
        let json = serde_json::to_value(&variables).unwrap();

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), variables.len());
        assert_eq!(object["MajorMinorPatch"], "1.0.0");
        assert!(object.values().all(|value| value.is_string()));
    }

    #[test]
    fn test_invalid_date_format() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single();
        assert_eq!(format_commit_date(date, "%Y-%"), "2024-03-09");
        assert_eq!(format_commit_date(None, "%Y"), "");
    }
}
