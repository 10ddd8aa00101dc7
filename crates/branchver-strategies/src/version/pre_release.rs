//! Pre-release tag

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest legacy pre-release tag, number included
const LEGACY_MAX_LEN: usize = 20;

/// The `-name.number` part of a version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreReleaseTag {
    pub name: String,
    pub number: Option<u64>,
    /// The number is a commit count rather than a release counter
    pub promoted_from_commits: bool,
}

impl PreReleaseTag {
    pub fn new(name: impl Into<String>, number: Option<u64>) -> Self {
        Self {
            name: name.into(),
            number,
            promoted_from_commits: false,
        }
    }

    /// Split `name.number` at the last dot when the tail is numeric.
    ///
    /// A purely numeric tag is a nameless number.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        if let Ok(number) = text.parse::<u64>() {
            return Self::new("", Some(number));
        }
        match text.rsplit_once('.') {
            Some((name, tail)) => match tail.parse::<u64>() {
                Ok(number) => Self::new(name, Some(number)),
                Err(_) => Self::new(text, None),
            },
            None => Self::new(text, None),
        }
    }

    /// Whether the tag makes the version a pre-release
    pub fn has_tag(&self) -> bool {
        !self.name.is_empty() || (self.number.is_some() && !self.promoted_from_commits)
    }

    /// Name reduced to its first dotted part without `-` or `+`
    fn legacy_name(&self) -> String {
        self.name
            .split('.')
            .next()
            .unwrap_or("")
            .replace(['-', '+'], "")
    }

    /// Legacy form (`beta4`, or `beta0004` when padded)
    pub fn to_legacy_string(&self, padding: Option<usize>) -> String {
        if !self.has_tag() {
            return String::new();
        }
        let name = self.legacy_name();
        let mut number = match (self.number, padding) {
            (Some(n), Some(width)) => format!("{:0width$}", n, width = width),
            (Some(n), None) => n.to_string(),
            (None, _) => String::new(),
        };
        if !number.is_empty() && name.ends_with(|c: char| c.is_ascii_digit()) {
            number.insert(0, '-');
        }
        let name_chars = name.chars().count();
        if name_chars + number.len() > LEGACY_MAX_LEN {
            let keep = LEGACY_MAX_LEN.saturating_sub(number.len()).min(name_chars);
            let truncated: String = name.chars().take(keep).collect();
            return format!("{}{}", truncated, number);
        }
        format!("{}{}", name, number)
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_tag() {
            return Ok(());
        }
        match (self.name.is_empty(), self.number) {
            (true, Some(number)) => write!(f, "{}", number),
            (false, Some(number)) => write!(f, "{}.{}", self.name, number),
            (_, None) => write!(f, "{}", self.name),
        }
    }
}

impl PartialOrd for PreReleaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreReleaseTag {
    /// A missing tag ranks above any tag; names compare case-insensitively,
    /// then numbers with a missing number lowest.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.has_tag(), other.has_tag()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => self
                .name
                .to_lowercase()
                .cmp(&other.name.to_lowercase())
                .then_with(|| self.number.cmp(&other.number)),
        }
    }
}
