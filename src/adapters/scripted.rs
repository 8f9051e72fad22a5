//! Deterministic stand-ins for the terminal and the host, used to drive a
//! whole session without git, docker or java installed.

use crate::domain::model::{CommandOutcome, CommandSpec};
use crate::domain::ports::{CommandRunner, Prompt};
use crate::utils::error::{CleanError, Result};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Answers prompts from a fixed queue and remembers every question asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn ask(&self, message: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        next.ok_or_else(|| CleanError::aborted(format!("input (script exhausted at {:?})", message)))
    }
}

type Hook = Box<dyn Fn(&CommandSpec) -> Option<CommandOutcome> + Send + Sync>;

/// Records every command and answers with exit code 0 unless a rule matches.
///
/// Rules are checked in insertion order against the rendered command line;
/// the first whose needle is contained in it decides the outcome. A rule with
/// `times = Some(n)` stops matching after `n` uses.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    rules: Arc<Mutex<Vec<Rule>>>,
    hooks: Arc<Mutex<Vec<Hook>>>,
    missing: Arc<Mutex<HashSet<String>>>,
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    outcome: CommandOutcome,
    times: Option<usize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `locate(program)` report the tool as not installed.
    pub fn without_tool(&self, program: &str) -> &Self {
        if let Ok(mut missing) = self.missing.lock() {
            missing.insert(program.to_string());
        }
        self
    }

    pub fn respond(&self, needle: &str, outcome: CommandOutcome) -> &Self {
        self.push_rule(needle, outcome, None)
    }

    pub fn respond_times(&self, needle: &str, outcome: CommandOutcome, times: usize) -> &Self {
        self.push_rule(needle, outcome, Some(times))
    }

    /// Runs `hook` before rule matching; used to emulate side effects such
    /// as `git clone` creating a directory or gitleaks writing a report.
    pub fn on_command<F>(&self, hook: F) -> &Self
    where
        F: Fn(&CommandSpec) -> Option<CommandOutcome> + Send + Sync + 'static,
    {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.push(Box::new(hook));
        }
        self
    }

    fn push_rule(&self, needle: &str, outcome: CommandOutcome, times: Option<usize>) -> &Self {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push(Rule {
                needle: needle.to_string(),
                outcome,
                times,
            });
        }
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.command_lines().iter().any(|line| line.contains(needle))
    }

    fn answer(&self, spec: &CommandSpec) -> CommandOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }

        if let Ok(hooks) = self.hooks.lock() {
            for hook in hooks.iter() {
                if let Some(outcome) = hook(spec) {
                    return outcome;
                }
            }
        }

        let line = spec.to_string();
        if let Ok(mut rules) = self.rules.lock() {
            for rule in rules.iter_mut() {
                if rule.times == Some(0) || !line.contains(&rule.needle) {
                    continue;
                }
                if let Some(left) = rule.times.as_mut() {
                    *left -= 1;
                }
                return rule.outcome.clone();
            }
        }
        CommandOutcome::exited(0)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn status(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        Ok(self.answer(spec))
    }

    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        Ok(self.answer(spec))
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        let missing = self
            .missing
            .lock()
            .map(|m| m.contains(program))
            .unwrap_or(false);
        (!missing).then(|| PathBuf::from("/usr/bin").join(program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_prompt_runs_out() {
        let prompt = ScriptedPrompt::new(["y"]);
        assert!(prompt.confirm("Push?").await.unwrap());
        assert!(prompt.ask("again").await.is_err());
        assert_eq!(prompt.asked(), vec!["Push? [y/N]: ".to_string(), "again".to_string()]);
    }

    #[tokio::test]
    async fn test_rules_expire_after_times() {
        let runner = RecordingRunner::new();
        runner.respond_times("git push", CommandOutcome::exited(1), 1);

        let spec = CommandSpec::new("git").args(["push", "origin", "main"]);
        assert_eq!(runner.status(&spec).await.unwrap().code, Some(1));
        assert_eq!(runner.status(&spec).await.unwrap().code, Some(0));
        assert_eq!(runner.calls().len(), 2);
    }
}
