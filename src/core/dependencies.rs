use crate::core::executor::Executor;
use crate::domain::model::CommandSpec;
use crate::utils::error::{CleanError, Result};

pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("git", "Git is required to manage repositories."),
    ("docker", "Docker is required to run Gitleaks."),
    ("java", "Java (JRE or JDK) is required to run BFG Repo-Cleaner."),
];

/// Verifies that git, docker and java are installed and the Docker daemon answers.
pub async fn check_dependencies(exec: &Executor) -> Result<()> {
    tracing::info!("Checking required dependencies...");

    let mut missing = Vec::new();
    for (tool, message) in REQUIRED_TOOLS {
        if exec.locate(tool).is_none() {
            tracing::error!("[MISSING] '{}' not found: {}", tool, message);
            missing.push(tool.to_string());
        }
    }

    if !missing.is_empty() {
        tracing::error!("Missing required tools: {}", missing.join(", "));
        tracing::error!("Please install the missing dependencies and try again.");
        return Err(CleanError::MissingDependencies { tools: missing });
    }

    tracing::info!("[OK] All required dependencies are available.");

    let outcome = exec
        .capture(CommandSpec::new("docker").arg("info"))
        .await
        .map_err(|e| CleanError::DockerUnavailable {
            message: e.to_string(),
        })?;

    if outcome.code != Some(0) {
        tracing::error!("Docker is installed but not running or not accessible to this user.");
        tracing::error!("Make sure the Docker daemon is running and your user is in the 'docker' group.");
        return Err(CleanError::DockerUnavailable {
            message: outcome.stderr.trim().to_string(),
        });
    }

    tracing::info!("[OK] Docker is running and accessible.");
    Ok(())
}
