//! Calculate command

use clap::Args;
use console::style;
use tracing::{info, warn};

use branchver_core::{BranchverError, RepositoryError};
use branchver_git::GitRepo;
use branchver_strategies::{calculate, CalculationRequest, VersionCalculation};

use crate::cli::config_args::ConfigArgs;
use crate::cli::{output, Cli, OutputFormat};

/// Branch name used when HEAD is detached
const DETACHED_BRANCH: &str = "HEAD";

/// Calculate the version of a branch or commit
#[derive(Debug, Args)]
pub struct CalculateCommand {
    /// Branch to version; defaults to the checked out branch
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Commit to version instead of the branch tip
    #[arg(long, value_name = "REV")]
    pub commit: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print a single variable, e.g. `FullSemVer`
    #[arg(long, value_name = "NAME")]
    pub show_variable: Option<String>,
}

impl CalculateCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(branch = ?self.branch, commit = ?self.commit, "executing calculate command");
        let cwd = std::env::current_dir()?;
        let repo = GitRepo::discover(&cwd)?;
        let (config, _) = self.config.load(&cwd)?;

        let request = self.request(&repo)?;
        let calculation = calculate(&repo, &config, &request)?;

        match &self.show_variable {
            Some(name) => self.output_variable(&calculation, name, cli),
            None => self.output_result(&calculation, &request, cli),
        }
    }

    fn request(&self, repo: &GitRepo) -> anyhow::Result<CalculationRequest> {
        let commit = self
            .commit
            .as_deref()
            .map(|rev| repo.resolve(rev))
            .transpose()?;

        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => match repo.head_branch() {
                Ok(branch) => branch,
                Err(BranchverError::Repository(RepositoryError::DetachedHead)) => {
                    warn!("HEAD is detached, versioning the checked out commit");
                    let head = repo.resolve(DETACHED_BRANCH)?;
                    return Ok(CalculationRequest::new(DETACHED_BRANCH)
                        .at_commit(commit.unwrap_or(head)));
                }
                Err(err) => return Err(err.into()),
            },
        };

        let request = CalculationRequest::new(branch);
        Ok(match commit {
            Some(sha) => request.at_commit(sha),
            None => request,
        })
    }

    fn output_variable(
        &self,
        calculation: &VersionCalculation,
        name: &str,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        let Some(value) = calculation.variables.get(name) else {
            let known: Vec<&str> = calculation.variables.iter().map(|(key, _)| key).collect();
            anyhow::bail!("Unknown variable '{}', expected one of: {}", name, known.join(", "));
        };

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({ name: value });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => println!("{}", value),
        }
        Ok(())
    }

    fn output_result(
        &self,
        calculation: &VersionCalculation,
        request: &CalculationRequest,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        let variables = &calculation.variables;
        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(variables)?);
            }
            OutputFormat::Text if cli.quiet => {
                println!("{}", calculation.version);
            }
            OutputFormat::Text => {
                println!("{}", output::header("Version Calculation"));
                println!();
                println!("  Branch:   {}", style(&request.branch).cyan());
                println!(
                    "  Version:  {}",
                    output::version_style().apply_to(variables.get("FullSemVer").unwrap_or_default())
                );
                if cli.verbose {
                    match &calculation.base {
                        Some(base) => println!("  Base:     {}", style(base).yellow()),
                        None => println!("  Base:     {}", style("tag on current commit").yellow()),
                    }
                }
                println!();

                let width = variables.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
                for (key, value) in variables.iter() {
                    println!("{}", output::key_value(key, value, width));
                }
            }
        }
        Ok(())
    }
}
