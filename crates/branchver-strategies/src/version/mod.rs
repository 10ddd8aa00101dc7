//! Semantic version types

mod build_metadata;
mod pre_release;
mod semantic;

pub use build_metadata::{escape_branch_name, BuildMetadata};
pub use pre_release::PreReleaseTag;
pub use semantic::SemanticVersion;
