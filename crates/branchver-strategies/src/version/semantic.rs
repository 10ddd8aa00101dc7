//! Semantic version value type

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use branchver_core::error::VersionError;
use branchver_core::{SemanticVersionFormat, VersionField};

use super::build_metadata::BuildMetadata;
use super::pre_release::PreReleaseTag;

static LOOSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<major>\d+)(\.(?P<minor>\d+))?(\.(?P<patch>\d+))?(-(?P<pre>[^+]*))?(\+(?P<meta>.*))?$",
    )
    .expect("Invalid regex")
});

/// Default prefix accepted by [`FromStr`]
const DEFAULT_PREFIX: &str = "[vV]?";

/// A semantic version with structured pre-release and build metadata
///
/// `PartialEq` compares every field, metadata included. Ordering (and
/// [`SemanticVersion::compare_precedence`]) ignores metadata, which is what
/// version selection uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: PreReleaseTag,
    pub build_metadata: BuildMetadata,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            ..Default::default()
        }
    }

    /// Same version with a pre-release tag
    pub fn with_pre_release(mut self, name: &str, number: Option<u64>) -> Self {
        self.pre_release = PreReleaseTag::new(name, number);
        self
    }

    /// Parse `{prefix}major(.minor(.patch)?)?(-tag)?(+meta)?`.
    ///
    /// `Strict` requires all three numeric parts. `None` means the text is not
    /// a version, which callers treat as "no candidate".
    pub fn try_parse(
        text: &str,
        tag_prefix: Option<&str>,
        format: SemanticVersionFormat,
    ) -> Option<Self> {
        let rest = match tag_prefix {
            Some(prefix) if !prefix.is_empty() => strip_prefix(text, prefix)?,
            _ => text.to_string(),
        };

        let parsed = match format {
            SemanticVersionFormat::Strict => semver::Version::parse(&rest).ok().map(Self::from),
            SemanticVersionFormat::Loose => parse_loose(&rest),
        };
        if parsed.is_none() {
            trace!(text, "not a version");
        }
        parsed
    }

    /// Loose parse without a prefix
    pub fn parse_loose(text: &str) -> Option<Self> {
        Self::try_parse(text, None, SemanticVersionFormat::Loose)
    }

    /// Compare major, minor, patch and pre-release; metadata is ignored
    pub fn compare_precedence(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| self.pre_release.cmp(&other.pre_release))
    }

    /// Whether the version carries a valued pre-release tag
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.has_tag()
    }

    /// Whether major.minor.patch are equal
    pub fn same_core(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }

    /// Apply a bump.
    ///
    /// Releases bump `field` and zero lower fields. Pre-releases keep
    /// major.minor.patch and bump their number, if any.
    pub fn increment(&self, field: VersionField) -> Self {
        let mut next = self.clone();
        if field == VersionField::None {
            return next;
        }

        if self.is_pre_release() {
            if let Some(number) = next.pre_release.number.as_mut() {
                *number += 1;
            }
            return next;
        }

        match field {
            VersionField::Major => {
                next.major += 1;
                next.minor = 0;
                next.patch = 0;
            }
            VersionField::Minor => {
                next.minor += 1;
                next.patch = 0;
            }
            VersionField::Patch => next.patch += 1,
            VersionField::None => {}
        }
        next
    }

    /// `major.minor.patch`
    pub fn major_minor_patch(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// SemVer: `major.minor.patch[-tag]`
    pub fn semver(&self) -> String {
        if self.pre_release.has_tag() {
            format!("{}-{}", self.major_minor_patch(), self.pre_release)
        } else {
            self.major_minor_patch()
        }
    }

    /// FullSemVer: SemVer plus `+commits` when counted
    pub fn full_semver(&self) -> String {
        match self.build_metadata.commits_since_tag {
            Some(count) => format!("{}+{}", self.semver(), count),
            None => self.semver(),
        }
    }

    /// InformationalVersion: SemVer plus the full metadata
    pub fn informational(&self) -> String {
        let metadata = self.build_metadata.full();
        if metadata.is_empty() {
            self.semver()
        } else {
            format!("{}+{}", self.semver(), metadata)
        }
    }

    /// Legacy SemVer, optionally with a zero-padded number
    pub fn legacy(&self, padding: Option<usize>) -> String {
        let tag = self.pre_release.to_legacy_string(padding);
        if tag.is_empty() {
            self.major_minor_patch()
        } else {
            format!("{}-{}", self.major_minor_patch(), tag)
        }
    }

    /// Render with a short format token: `s`, `f`, `i`, `j`, `l` or `lp`
    pub fn format(&self, token: &str, legacy_padding: usize) -> Result<String, VersionError> {
        match token {
            "j" => Ok(self.major_minor_patch()),
            "s" => Ok(self.semver()),
            "f" => Ok(self.full_semver()),
            "i" => Ok(self.informational()),
            "l" => Ok(self.legacy(None)),
            "lp" => Ok(self.legacy(Some(legacy_padding))),
            other => Err(VersionError::InvalidFormat(other.to_string())),
        }
    }
}

fn strip_prefix(text: &str, prefix: &str) -> Option<String> {
    let regex = Regex::new(&format!("^(?:{})?(?P<rest>.*)$", prefix)).ok()?;
    regex
        .captures(text)
        .and_then(|caps| caps.name("rest"))
        .map(|m| m.as_str().to_string())
}

fn parse_loose(text: &str) -> Option<SemanticVersion> {
    let caps = LOOSE_REGEX.captures(text)?;
    let number = |name: &str| -> Option<u64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(SemanticVersion {
        major: number("major")?,
        minor: number("minor")?,
        patch: number("patch")?,
        pre_release: caps
            .name("pre")
            .map(|m| PreReleaseTag::parse(m.as_str()))
            .unwrap_or_default(),
        build_metadata: caps
            .name("meta")
            .map(|m| BuildMetadata::parse(m.as_str()))
            .unwrap_or_default(),
    })
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_precedence(other)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.semver())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s, Some(DEFAULT_PREFIX), SemanticVersionFormat::Loose).ok_or_else(|| {
            VersionError::ParseFailed(
                s.to_string(),
                "expected major[.minor[.patch]][-tag][+metadata]".to_string(),
            )
        })
    }
}

impl From<semver::Version> for SemanticVersion {
    fn from(version: semver::Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre_release: PreReleaseTag::parse(version.pre.as_str()),
            build_metadata: BuildMetadata::parse(version.build.as_str()),
        }
    }
}

impl From<&SemanticVersion> for semver::Version {
    fn from(version: &SemanticVersion) -> Self {
        let mut out = semver::Version::new(version.major, version.minor, version.patch);
        if version.pre_release.has_tag() {
            out.pre = semver::Prerelease::new(&version.pre_release.to_string())
                .unwrap_or(semver::Prerelease::EMPTY);
        }
        out.build = semver::BuildMetadata::new(&version.build_metadata.full())
            .unwrap_or(semver::BuildMetadata::EMPTY);
        out
    }
}
