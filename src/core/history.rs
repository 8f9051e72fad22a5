use crate::core::checklist;
use crate::core::executor::Executor;
use crate::domain::model::CommandSpec;
use crate::utils::error::Result;
use std::path::Path;

/// Drops the reflog and garbage-collects so rewritten objects are really gone.
pub async fn expire_and_gc(exec: &Executor, repo: &Path) -> Result<()> {
    exec.run(
        CommandSpec::new("git")
            .args(["reflog", "expire", "--expire=now", "--all"])
            .current_dir(repo),
    )
    .await?;
    exec.run(
        CommandSpec::new("git")
            .args(["gc", "--prune=now", "--aggressive"])
            .current_dir(repo),
    )
    .await?;
    Ok(())
}

/// Force-pushes all branches and tags of `repo` after confirmation.
/// Returns whether anything was pushed.
pub async fn force_push(exec: &Executor, repo: &Path, dry_run: bool) -> Result<bool> {
    if dry_run {
        tracing::info!("[DRY RUN] Skipping force-push of cleaned commit history and tags.");
        return Ok(false);
    }

    if !exec
        .confirm("Do you want to force-push cleaned commit history and tags?")
        .await?
    {
        tracing::warn!("[SKIPPED] Force push skipped.");
        return Ok(false);
    }

    tracing::info!("Force pushing cleaned commit history and tags.");
    for refs in ["--all", "--tags"] {
        exec.run(
            CommandSpec::new("git")
                .args(["push", "--force", refs])
                .current_dir(repo),
        )
        .await?;
    }
    checklist::log_reminders();
    Ok(true)
}
