use crate::domain::ports::Prompt;
use crate::utils::error::{CleanError, Result};
use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Reads answers from the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prompt for StdinPrompt {
    async fn ask(&self, message: &str) -> Result<String> {
        let message = message.to_string();
        let line = tokio::task::spawn_blocking(move || -> std::io::Result<Option<String>> {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{}", message)?;
            stdout.flush()?;

            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await
        .map_err(|e| CleanError::IoError(std::io::Error::other(e)))??;

        // EOF on stdin ends the session the same way typing `exit` would.
        match line {
            Some(line) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            None => Err(CleanError::aborted("input (stdin closed)")),
        }
    }
}
