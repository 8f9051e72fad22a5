use crate::domain::model::{CommandOutcome, CommandSpec};
use crate::domain::ports::{CommandRunner, Prompt};
use crate::utils::error::{CleanError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Runs external commands and owns the conversation with the operator.
///
/// A command that exits with a code outside its acceptable set (or cannot be
/// spawned) is reported and the operator is asked whether to retry. Declining
/// turns the failure into [`CleanError::CommandFailed`].
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    prompt: Arc<dyn Prompt>,
}

impl Executor {
    pub fn new(runner: Arc<dyn CommandRunner>, prompt: Arc<dyn Prompt>) -> Self {
        Self { runner, prompt }
    }

    pub fn prompt(&self) -> &dyn Prompt {
        self.prompt.as_ref()
    }

    pub fn locate(&self, program: &str) -> Option<PathBuf> {
        self.runner.locate(program)
    }

    pub async fn run(&self, spec: CommandSpec) -> Result<CommandOutcome> {
        loop {
            tracing::info!("[CMD] {}", spec);

            let reason = match self.runner.status(&spec).await {
                Ok(outcome) if spec.accepts(outcome.code) => return Ok(outcome),
                Ok(outcome) => {
                    let reason = match outcome.code {
                        Some(code) => format!("exited with code {}", code),
                        None => "terminated by signal".to_string(),
                    };
                    tracing::error!("Command failed: {}", reason);
                    reason
                }
                Err(e) => {
                    tracing::error!("Unexpected error: {}", e);
                    e.to_string()
                }
            };

            if !self.prompt.confirm("Do you want to retry the command?").await? {
                return Err(CleanError::command_failed(spec.to_string(), reason));
            }
        }
    }

    /// Runs with output captured and without the retry dialogue. The exit
    /// code is returned as-is for the caller to interpret.
    pub async fn capture(&self, spec: CommandSpec) -> Result<CommandOutcome> {
        tracing::debug!("[CMD] {}", spec);
        self.runner.output(&spec).await
    }

    pub async fn ask(&self, message: &str) -> Result<String> {
        self.prompt.ask(message).await
    }

    pub async fn confirm(&self, message: &str) -> Result<bool> {
        self.prompt.confirm(message).await
    }

    /// Shows `message`; typing `exit` aborts `stage`, anything else continues.
    pub async fn pause_unless_exit(&self, message: &str, stage: &str) -> Result<()> {
        let answer = self.prompt.ask(message).await?;
        if answer.trim().eq_ignore_ascii_case("exit") {
            tracing::warn!("Exiting as requested by user.");
            return Err(CleanError::aborted(stage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{RecordingRunner, ScriptedPrompt};

    fn executor(runner: &RecordingRunner, answers: &[&str]) -> (Executor, Arc<ScriptedPrompt>) {
        let prompt = Arc::new(ScriptedPrompt::new(answers.iter().copied()));
        (Executor::new(Arc::new(runner.clone()), prompt.clone()), prompt)
    }

    #[tokio::test]
    async fn test_success_does_not_prompt() {
        let runner = RecordingRunner::new();
        let (exec, prompt) = executor(&runner, &[]);
        exec.run(CommandSpec::new("git").arg("status")).await.unwrap();
        assert!(prompt.asked().is_empty());
        assert_eq!(runner.command_lines(), vec!["git status"]);
    }

    #[tokio::test]
    async fn test_failure_retries_until_success() {
        let runner = RecordingRunner::new();
        runner.respond_times("git pull", CommandOutcome::exited(128), 2);
        let (exec, prompt) = executor(&runner, &["y", "Y"]);

        let outcome = exec.run(CommandSpec::new("git").arg("pull")).await.unwrap();
        assert_eq!(outcome.code, Some(0));
        assert_eq!(runner.calls().len(), 3);
        assert_eq!(prompt.asked().len(), 2);
    }

    #[tokio::test]
    async fn test_declined_retry_is_command_failed() {
        let runner = RecordingRunner::new();
        runner.respond("git push", CommandOutcome::exited(1));
        let (exec, _) = executor(&runner, &["n"]);

        let err = exec
            .run(CommandSpec::new("git").args(["push", "--force", "--all"]))
            .await
            .unwrap_err();
        match err {
            CleanError::CommandFailed { command, reason } => {
                assert_eq!(command, "git push --force --all");
                assert_eq!(reason, "exited with code 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_acceptable_codes_are_success() {
        let runner = RecordingRunner::new();
        runner.respond("gitleaks", CommandOutcome::exited(1));
        let (exec, prompt) = executor(&runner, &[]);

        let spec = CommandSpec::new("docker")
            .args(["run", "zricethezav/gitleaks:latest"])
            .acceptable(&[0, 1]);
        assert_eq!(exec.run(spec).await.unwrap().code, Some(1));
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_pause_unless_exit() {
        let runner = RecordingRunner::new();
        let (exec, _) = executor(&runner, &["", " EXIT "]);
        assert!(exec.pause_unless_exit("continue?", "review").await.is_ok());
        assert!(matches!(
            exec.pause_unless_exit("continue?", "review").await,
            Err(CleanError::Aborted { .. })
        ));
    }
}
