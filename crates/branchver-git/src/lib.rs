//! branchver git - repository access for version calculation
//!
//! This crate defines the read-only [`RepositoryProvider`] capability and two
//! implementations: [`MemoryRepository`], an in-memory commit arena used for
//! graph scenarios, and [`GitRepo`], backed by `git2`.

mod branches;
mod commits;
pub mod memory;
pub mod provider;
mod repository;
mod tags;
pub mod types;

#[cfg(test)]
mod test_support;

pub use memory::MemoryRepository;
pub use provider::RepositoryProvider;
pub use repository::GitRepo;
pub use types::{BranchInfo, CommitInfo, TagInfo};
