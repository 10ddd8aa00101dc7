//! Shell completion scripts

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use tracing::info;

use crate::cli::{output, Cli};

const BIN_NAME: &str = "branchver";

/// Print a completion script for a shell
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, output = ?self.output, "executing completions command");

        let Some(path) = &self.output else {
            write_script(self.shell, &mut std::io::stdout());
            return Ok(());
        };

        let mut file = std::fs::File::create(path)?;
        write_script(self.shell, &mut file);
        if !cli.quiet {
            output::info(&format!(
                "{} completions written to {}",
                self.shell,
                output::path_style().apply_to(path.display())
            ));
        }
        Ok(())
    }
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_script_mentions_subcommands() {
        let mut buffer = Vec::new();
        write_script(Shell::Bash, &mut buffer);

        let script = String::from_utf8(buffer).unwrap();
        assert!(script.contains("calculate"));
        assert!(script.contains("completions"));
    }

    #[test]
    fn test_writes_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("branchver.fish");
        let cli = Cli::try_parse_from([
            "branchver",
            "-q",
            "completions",
            "fish",
            "--output",
            path.to_str().unwrap(),
        ])
        .unwrap();

        cli.execute().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("branchver"));
    }
}
