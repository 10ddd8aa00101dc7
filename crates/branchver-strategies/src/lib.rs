//! branchver strategies - version calculation from git history
//!
//! Base version strategies propose candidate versions, the calculator picks
//! and increments the winner and the variable provider renders the result.
//! [`calculate_version`] runs the whole pipeline against any
//! [`RepositoryProvider`](branchver_git::RepositoryProvider).

pub mod branch_name;
pub mod cache;
pub mod calculator;
pub mod context;
pub mod effective;
pub mod engine;
pub mod filters;
pub mod increment;
pub mod mainline;
pub mod merge_message;
pub mod registry;
pub mod strategies;
mod traits;
pub mod types;
pub mod variables;
pub mod version;
pub mod version_point;

#[cfg(test)]
mod test_support;

pub use cache::{calculate_cached, CacheKey, VersionCache};
pub use calculator::NextVersionCalculator;
pub use context::{GitVersionContext, TaggedVersion};
pub use effective::{resolve_effective_configurations, EffectiveBranchConfiguration};
pub use engine::{calculate, calculate_version, CalculationRequest, VersionCalculation};
pub use registry::StrategyRegistry;
pub use traits::VersionStrategy;
pub use types::{BaseVersion, NextVersion};
pub use variables::VersionVariables;
pub use version::{BuildMetadata, PreReleaseTag, SemanticVersion};
