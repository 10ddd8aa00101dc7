//! CLI commands

mod calculate;
mod completions;
mod config;

pub use calculate::CalculateCommand;
pub use completions::CompletionsCommand;
pub use config::ConfigCommand;
