pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::repo_name_from_url;
#[cfg(feature = "cli")]
use crate::utils::error::{CleanError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gitclean")]
#[command(version)]
#[command(about = "Clean API keys, passwords and other secrets out of a git repository")]
pub struct CliConfig {
    /// URL (or local path) of the git repository to clean
    #[arg(required_unless_present = "checklist")]
    pub repo_url: Option<String>,

    /// Path to a BFG Repo-Cleaner jar; downloaded and cached when omitted
    #[arg(long)]
    pub bfg: Option<PathBuf>,

    /// Skip committing and pushing changes
    #[arg(long)]
    pub dry_run: bool,

    /// TOML file overriding tool locations and images
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the post-rewrite checklist and exit
    #[arg(long)]
    pub checklist: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.checklist {
            return Ok(());
        }

        let repo_url = validation::validate_required_field("repo_url", &self.repo_url)?;
        validation::validate_repo_url("repo_url", repo_url)?;
        repo_name_from_url(repo_url)?;

        if let Some(bfg) = &self.bfg {
            validation::validate_jar_path("bfg", bfg)?;
        }
        if let Some(config) = &self.config {
            validation::validate_path("config", &config.display().to_string())?;
            if !config.is_file() {
                return Err(CleanError::InvalidConfigValueError {
                    field: "config".to_string(),
                    value: config.display().to_string(),
                    reason: "Config file does not exist".to_string(),
                });
            }
        }
        Ok(())
    }
}
