//! branchver core - shared library for branch-aware semantic versioning
//!
//! This crate provides the foundational types, error handling and the
//! branch configuration model (presets, overrides, validation and loading)
//! used by the git and calculation crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BranchConfiguration, ConfigOverrides, ConfigurationBuilder, EffectiveConfiguration,
    GitVersionConfiguration, IgnoreConfiguration, PreventIncrementConfiguration,
};
pub use error::{
    BranchverError, ConfigError, RepositoryError, Result, TopologyError, VersionError,
};
pub use types::{
    AssemblyVersioningScheme, CommitMessageIncrementMode, DeploymentMode, IncrementStrategy,
    SemanticVersionFormat, VersionField, VersionStrategyKind, Workflow,
};
