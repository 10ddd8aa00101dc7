//! Error types for branchver

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using BranchverError
pub type Result<T> = std::result::Result<T, BranchverError>;

/// Main error type for branchver operations
#[derive(Debug, Error)]
pub enum BranchverError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Repository state errors
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Commit graph shapes the calculation cannot handle
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A branch refers to a branch key that is not configured
    #[error("Branch '{branch}' references unknown source branch '{source_branch}'")]
    UnknownSourceBranch {
        branch: String,
        source_branch: String,
    },

    /// A branch pattern does not compile
    #[error("Invalid regex for branch '{branch}': {reason}")]
    InvalidPattern { branch: String, reason: String },

    /// Two options that cannot be combined
    #[error("Conflicting configuration for '{key}': {message}")]
    Conflict { key: String, message: String },

    /// Unknown workflow preset name
    #[error("Unknown workflow '{0}'")]
    UnknownWorkflow(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository state errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// HEAD does not point at a branch
    #[error("HEAD is detached; pass a branch name explicitly")]
    DetachedHead,

    /// Branch does not exist
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    /// Commit does not exist
    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    /// No parentless commit reachable (shallow clone)
    #[error("No root commit reachable from {0}; the repository may be a shallow clone")]
    NoRootCommit(String),

    /// No branch configured as main reaches the current commit
    #[error("No mainline branch found for '{0}'")]
    NoMainline(String),

    /// Inherited increment could not be resolved
    #[error("Branch '{branch}' inherits its increment but none of its source branches exist ({sources})")]
    NoEffectiveConfiguration { branch: String, sources: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Unsupported commit graph shapes
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Merge commit with more than one merged head
    #[error("Octopus merge {sha} has {parents} parents; only two-parent merges are supported")]
    OctopusMerge { sha: String, parents: usize },

    /// Mainline replay cannot start from a pre-release
    #[error("Mainline versioning does not support pre-release tags on the mainline ({0})")]
    MainlinePreRelease(String),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Invalid version format
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),

    /// An internal calculation invariant did not hold
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl BranchverError {
    /// Whether this error is a configuration problem
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<git2::Error> for BranchverError {
    fn from(err: git2::Error) -> Self {
        Self::Repository(RepositoryError::Git2(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err: BranchverError = ConfigError::UnknownSourceBranch {
            branch: "feature".to_string(),
            source_branch: "trunk".to_string(),
        }
        .into();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Branch 'feature' references unknown source branch 'trunk'"
        );

        let err: BranchverError = TopologyError::OctopusMerge {
            sha: "abc".to_string(),
            parents: 3,
        }
        .into();
        assert!(err.to_string().contains("abc"));
        assert!(!err.is_config());
    }
}
