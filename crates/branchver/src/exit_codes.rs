//! Exit codes for the CLI

use branchver_core::BranchverError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Repository error
pub const GIT_ERROR: i32 = 3;

/// Version error
pub const VERSION_ERROR: i32 = 4;

/// Commit graph the calculation cannot handle
pub const TOPOLOGY_ERROR: i32 = 5;

/// Exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BranchverError>() {
        Some(BranchverError::Config(_)) => CONFIG_ERROR,
        Some(BranchverError::Repository(_)) => GIT_ERROR,
        Some(BranchverError::Version(_)) => VERSION_ERROR,
        Some(BranchverError::Topology(_)) => TOPOLOGY_ERROR,
        _ => ERROR,
    }
}
