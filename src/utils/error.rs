use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Download request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Missing required tools: {}", .tools.join(", "))]
    MissingDependencies { tools: Vec<String> },

    #[error("Docker is installed but not running or not accessible: {message}")]
    DockerUnavailable { message: String },

    #[error("Failed to download {url}: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Aborted by operator: {stage}")]
    Aborted { stage: String },

    #[error("Interrupted")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Environment,
    ExternalCommand,
    Network,
    Data,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CleanError {
    pub fn command_failed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn aborted(stage: impl Into<String>) -> Self {
        Self::Aborted {
            stage: stage.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::MissingDependencies { .. } | Self::DockerUnavailable { .. } => {
                ErrorCategory::Environment
            }
            Self::CommandFailed { .. } | Self::IoError(_) => ErrorCategory::ExternalCommand,
            Self::HttpError(_) | Self::DownloadFailed { .. } => ErrorCategory::Network,
            Self::SerializationError(_) => ErrorCategory::Data,
            Self::Aborted { .. } | Self::Interrupted => ErrorCategory::Operator,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Aborted { .. } | Self::Interrupted => ErrorSeverity::Low,
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::TomlError(_) => ErrorSeverity::Medium,
            Self::CommandFailed { .. }
            | Self::HttpError(_)
            | Self::DownloadFailed { .. }
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::MissingDependencies { .. }
            | Self::DockerUnavailable { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingDependencies { .. } => {
                "Install the missing tools (git, docker, java) and try again".to_string()
            }
            Self::DockerUnavailable { .. } => {
                "Make sure the Docker daemon is running and your user is in the 'docker' group"
                    .to_string()
            }
            Self::CommandFailed { .. } => {
                "Check the command output above; the backup mirror is untouched if you need to start over"
                    .to_string()
            }
            Self::DownloadFailed { .. } | Self::HttpError(_) => {
                "Download BFG manually and pass it with --bfg <path/to/bfg.jar>".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and rerun", field)
            }
            Self::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            Self::TomlError(_) => "Check the syntax of the --config file".to_string(),
            Self::SerializationError(_) => {
                "The gitleaks report could not be parsed; rerun the scan".to_string()
            }
            Self::IoError(_) => "Check file permissions and free disk space".to_string(),
            Self::Aborted { .. } | Self::Interrupted => {
                "Rerun gitclean when you are ready to continue".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingDependencies { tools } => {
                format!("Missing required tools: {}", tools.join(", "))
            }
            Self::DockerUnavailable { .. } => {
                "Docker is installed but not running or not accessible to this user".to_string()
            }
            Self::CommandFailed { command, .. } => format!("Command failed: {}", command),
            Self::Aborted { stage } => format!("Stopped during {}", stage),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if matches!(self, Self::Interrupted) {
            return 130;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High | ErrorSeverity::Critical => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_abort_is_not_a_failure() {
        let err = CleanError::aborted("manual cleanup");
        assert_eq!(err.category(), ErrorCategory::Operator);
        assert_eq!(err.exit_code(), 0);
        assert_eq!(err.user_friendly_message(), "Stopped during manual cleanup");
    }

    #[test]
    fn test_missing_dependencies_message() {
        let err = CleanError::MissingDependencies {
            tools: vec!["docker".to_string(), "java".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required tools: docker, java");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_interrupt_exit_code() {
        assert_eq!(CleanError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_config_errors_exit_with_two() {
        let err = CleanError::MissingConfigError {
            field: "repo_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 2);
    }
}
