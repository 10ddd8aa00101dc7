//! Mainline replay as a strategy

use branchver_core::error::Result;
use branchver_core::{EffectiveConfiguration, VersionStrategyKind};

use crate::context::GitVersionContext;
use crate::mainline::MainlineVersionCalculator;
use crate::traits::VersionStrategy;
use crate::types::BaseVersion;

/// Replays mainline history unless a next version is configured
pub struct MainlineStrategy;

impl VersionStrategy for MainlineStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::Mainline
    }

    fn versions(
        &self,
        ctx: &GitVersionContext<'_>,
        config: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if config.next_version.is_some() {
            return Ok(Vec::new());
        }
        Ok(vec![MainlineVersionCalculator::new(ctx, config).calculate()?])
    }
}
