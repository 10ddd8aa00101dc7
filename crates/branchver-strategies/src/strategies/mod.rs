//! Base version strategy implementations

mod configured_next_version;
mod fallback;
mod mainline;
mod merge_message;
mod tagged_commit;
mod track_merge_target;
mod track_release_branches;
mod version_in_branch_name;

pub use configured_next_version::ConfiguredNextVersionStrategy;
pub use fallback::FallbackStrategy;
pub use mainline::MainlineStrategy;
pub use merge_message::MergeMessageStrategy;
pub use tagged_commit::TaggedCommitStrategy;
pub use track_merge_target::TrackMergeTargetStrategy;
pub use track_release_branches::TrackReleaseBranchesStrategy;
pub use version_in_branch_name::VersionInBranchNameStrategy;
