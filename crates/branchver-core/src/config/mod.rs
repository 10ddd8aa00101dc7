//! Configuration system for branchver

mod builder;
pub mod defaults;
mod effective;
mod loader;
mod overrides;
pub mod presets;
mod types;
pub mod validation;

pub use builder::*;
pub use defaults::*;
pub use effective::*;
pub use loader::*;
pub use overrides::*;
pub use presets::preset;
pub use types::*;
pub use validation::*;
