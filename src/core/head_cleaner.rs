use crate::core::executor::Executor;
use crate::core::gitleaks::Gitleaks;
use crate::domain::model::{CommandSpec, RepoLayout};
use crate::utils::error::Result;
use crate::utils::validation::validate_branch_name;

/// Splits comma-separated branch input, dropping blanks.
pub fn parse_branches(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

/// Step 1: scrub secrets from the tip of important branches by hand and
/// commit the result, before touching history.
pub struct HeadCleaner<'a> {
    layout: &'a RepoLayout,
    exec: &'a Executor,
    gitleaks_image: &'a str,
    dry_run: bool,
}

impl<'a> HeadCleaner<'a> {
    pub fn new(
        layout: &'a RepoLayout,
        exec: &'a Executor,
        gitleaks_image: &'a str,
        dry_run: bool,
    ) -> Self {
        Self {
            layout,
            exec,
            gitleaks_image,
            dry_run,
        }
    }

    /// Asks for branches and cleans each one in order.
    pub async fn run(&self) -> Result<()> {
        let input = self
            .exec
            .ask("Enter the branch name(s) to clean (comma-separated): ")
            .await?;
        let branches = parse_branches(&input);
        if branches.is_empty() {
            tracing::warn!("Branch name cannot be empty.");
            return Ok(());
        }

        for branch in branches {
            if let Err(e) = validate_branch_name("branch", &branch) {
                tracing::warn!("Skipping '{}': {}", branch, e);
                continue;
            }
            tracing::info!("Cleaning branch '{}'", branch);
            self.clean_branch(&branch).await?;
        }
        Ok(())
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::new("git").current_dir(self.layout.clone_dir())
    }

    pub async fn clean_branch(&self, branch: &str) -> Result<()> {
        let clone_dir = self.layout.clone_dir();
        let gitleaks = Gitleaks::new(self.exec, self.gitleaks_image);

        tracing::info!("Checking out branch: {}", branch);
        self.exec.run(self.git().args(["checkout", branch])).await?;

        gitleaks.scan_dir(&clone_dir).await?;

        self.exec
            .pause_unless_exit(
                "[ACTION REQUIRED] Cleanup the files manually if secrets are found.\n\
                 Ignore false positives, note them separately.\n\
                 Type 'exit' to abort or press Enter to continue... ",
                "manual cleanup",
            )
            .await?;

        tracing::info!("Scanning after manual cleanup: {}", branch);
        gitleaks.scan_dir(&clone_dir).await?;

        if self.dry_run {
            tracing::info!("[DRY RUN] Skipping commit & push for branch: {}", branch);
            return Ok(());
        }

        if !self.exec.confirm("Do you want to commit and push changes?").await? {
            tracing::warn!("[SKIPPED] Commit & push skipped for branch: {}", branch);
            return Ok(());
        }

        tracing::info!("Committing and pushing changes for branch: {}", branch);
        self.exec.run(self.git().args(["add", "."])).await?;
        self.exec
            .run(
                self.git()
                    .args(["commit", "-m"])
                    .arg(format!("Removed secrets from {}", branch)),
            )
            .await?;
        self.exec
            .run(self.git().args(["push", "origin", branch]))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_branches() {
        assert_eq!(
            parse_branches(" main, release/1.0 ,,develop , "),
            vec!["main", "release/1.0", "develop"]
        );
        assert!(parse_branches(" , ,").is_empty());
        assert!(parse_branches("").is_empty());
    }
}
