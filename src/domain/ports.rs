use crate::domain::model::{CommandOutcome, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Spawns external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs with the terminal attached; stdout/stderr are not captured.
    async fn status(&self, spec: &CommandSpec) -> Result<CommandOutcome>;

    /// Runs with stdout/stderr captured.
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutcome>;

    /// Resolves `program` on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Line-oriented operator input.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Shows `message` and returns the raw line typed (without the newline).
    async fn ask(&self, message: &str) -> Result<String>;

    async fn confirm(&self, message: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]: ", message)).await?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}
