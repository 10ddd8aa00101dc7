//! Config command

use clap::Args;
use tracing::info;

use crate::cli::config_args::ConfigArgs;
use crate::cli::{output, Cli, OutputFormat};

/// Print the effective configuration after presets, files and overrides
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ConfigCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(workflow = ?self.config.workflow, "executing config command");
        let cwd = std::env::current_dir()?;
        let (config, path) = self.config.load(&cwd)?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            OutputFormat::Text => {
                if !cli.quiet {
                    let origin = match &path {
                        Some(path) => output::path_style().apply_to(path.display()).to_string(),
                        None => "workflow preset".to_string(),
                    };
                    output::info(&format!("Configuration from {origin}"));
                }
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }
        Ok(())
    }
}
