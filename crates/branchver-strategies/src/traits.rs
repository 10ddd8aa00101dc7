//! Base version strategy trait

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::types::BaseVersion;

/// Produces base version candidates for the current commit
///
/// An empty vector means the strategy found nothing, which is never an
/// error. Errors are reserved for broken repository state or topology.
pub trait VersionStrategy: Send + Sync {
    /// Which strategy this is; also fixes its evaluation order
    fn kind(&self) -> VersionStrategyKind;

    /// Candidates for the current commit
    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>>;

    /// Get the name of this strategy
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
