use crate::core::executor::Executor;
use crate::domain::model::{CommandSpec, ExistingCopyAction, RepoLayout};
use crate::utils::error::{CleanError, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Creates the work directory and clears the outputs of an earlier run.
/// Runs before logging is set up, so it does not log.
pub fn create_work_dir(layout: &RepoLayout) -> Result<()> {
    fs::create_dir_all(&layout.work_dir)?;
    for stale in [layout.secrets_path(), layout.report_path()] {
        if stale.exists() {
            fs::remove_file(stale)?;
        }
    }
    Ok(())
}

/// The working clone, the mirror and its backup, inside the work directory.
pub struct Workspace<'a> {
    layout: &'a RepoLayout,
    exec: &'a Executor,
}

impl<'a> Workspace<'a> {
    pub fn new(layout: &'a RepoLayout, exec: &'a Executor) -> Self {
        Self { layout, exec }
    }

    pub async fn prepare(&self) -> Result<()> {
        self.ensure_clone().await?;
        self.ensure_mirror().await?;
        self.ensure_backup().await?;
        Ok(())
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::new("git").current_dir(&self.layout.work_dir)
    }

    async fn clone_working_copy(&self) -> Result<()> {
        self.exec
            .run(self.git().arg("clone").arg(&self.layout.repo_url))
            .await?;
        Ok(())
    }

    async fn clone_mirror(&self) -> Result<()> {
        self.exec
            .run(self.git().args(["clone", "--mirror"]).arg(&self.layout.repo_url))
            .await?;
        Ok(())
    }

    pub async fn ensure_clone(&self) -> Result<()> {
        let clone_dir = self.layout.clone_dir();
        if !clone_dir.exists() {
            tracing::info!("Cloning repository {}", self.layout.repo_url);
            return self.clone_working_copy().await;
        }

        tracing::warn!("Repository {} already exists.", self.layout.repo_name);
        let answer = self
            .exec
            .ask(
                "To erase all local uncommitted changes (tracked and untracked) type 'restore'.\n\
                 OR To delete this local copy and download again type 'discard'.\n\
                 OR To continue with this copy press Enter...\n\
                 OR To exit type 'exit'.\n",
            )
            .await?;

        match ExistingCopyAction::parse(&answer) {
            ExistingCopyAction::Restore => {
                tracing::info!("Erasing all local uncommitted changes (tracked and untracked)...");
                let steps: [&[&str]; 3] = [&["reset", "--hard"], &["clean", "-fd"], &["pull"]];
                for args in steps {
                    self.exec
                        .run(CommandSpec::new("git").args(args.iter().copied()).current_dir(&clone_dir))
                        .await?;
                }
            }
            ExistingCopyAction::Discard => {
                tracing::info!("Deleting local copy and re-cloning repository...");
                fs::remove_dir_all(&clone_dir)?;
                self.clone_working_copy().await?;
            }
            ExistingCopyAction::Exit => {
                tracing::info!("Exiting as requested by user.");
                return Err(CleanError::aborted("workspace preparation"));
            }
            ExistingCopyAction::Continue => {
                tracing::warn!("Continuing with existing repository, it may have uncommitted changes.");
            }
        }
        Ok(())
    }

    pub async fn ensure_mirror(&self) -> Result<()> {
        let mirror_dir = self.layout.mirror_dir();
        if !mirror_dir.exists() {
            tracing::info!("Cloning mirror of repository {}", self.layout.repo_url);
            return self.clone_mirror().await;
        }

        tracing::warn!("Mirror {} already exists.", mirror_dir.display());
        let answer = self
            .exec
            .ask(
                "To continue with this press Enter...\n\
                 OR To delete this local copy and download again type 'discard'.\n\
                 OR to exit type 'exit'.\n",
            )
            .await?;

        match ExistingCopyAction::parse(&answer) {
            ExistingCopyAction::Discard => {
                tracing::info!("Deleting local copy and re-cloning mirror of repository...");
                fs::remove_dir_all(&mirror_dir)?;
                self.clone_mirror().await?;
            }
            ExistingCopyAction::Exit => {
                tracing::info!("Exiting as requested by user.");
                return Err(CleanError::aborted("workspace preparation"));
            }
            ExistingCopyAction::Restore | ExistingCopyAction::Continue => {}
        }
        Ok(())
    }

    /// The backup is a plain copy of the mirror taken before anything is rewritten.
    pub async fn ensure_backup(&self) -> Result<()> {
        let mirror_dir = self.layout.mirror_dir();
        let backup_dir = self.layout.backup_dir();
        if !backup_dir.exists() {
            tracing::info!("Creating backup from mirror at {}", backup_dir.display());
            return copy_dir_recursive(&mirror_dir, &backup_dir);
        }

        tracing::warn!("Backup {} already exists.", backup_dir.display());
        let answer = self
            .exec
            .ask(&format!(
                "To continue with this backup press Enter...\n\
                 OR To delete this backup and copy again from {} type 'discard'.\n\
                 OR to exit type 'exit'.\n",
                mirror_dir.display()
            ))
            .await?;

        match ExistingCopyAction::parse(&answer) {
            ExistingCopyAction::Discard => {
                tracing::info!("Removing existing backup at {}", backup_dir.display());
                fs::remove_dir_all(&backup_dir)?;
                tracing::info!("Creating new backup from mirror at {}", backup_dir.display());
                copy_dir_recursive(&mirror_dir, &backup_dir)
            }
            ExistingCopyAction::Exit => {
                tracing::info!("Exiting as requested by user.");
                Err(CleanError::aborted("workspace preparation"))
            }
            ExistingCopyAction::Restore | ExistingCopyAction::Continue => Ok(()),
        }
    }
}

pub fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| CleanError::IoError(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| CleanError::IoError(std::io::Error::other(e)))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
