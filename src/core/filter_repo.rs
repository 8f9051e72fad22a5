use crate::config::toml_config::FilterRepoConfig;
use crate::core::executor::Executor;
use crate::core::gitleaks::Gitleaks;
use crate::core::history;
use crate::domain::model::{CommandSpec, RepoLayout, FILTER_REPO_DIR, REPORT_FILE, SECRETS_FILE};
use crate::utils::error::Result;
use crate::utils::processes;
use std::fs;
use std::path::PathBuf;

/// The case-sensitive volume git-filter-repo works on, if one is attached.
#[derive(Debug, Default)]
pub struct Volume {
    mounted: Option<PathBuf>,
}

impl Volume {
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn mount_point(&self) -> Option<&PathBuf> {
        self.mounted.as_ref()
    }

    /// Creates the disk image if needed and attaches it.
    pub async fn attach(&mut self, exec: &Executor, config: &FilterRepoConfig) -> Result<PathBuf> {
        let image = config.disk_image()?;
        let volume_path = config.volume_path();

        tracing::info!("Creating a case-sensitive disk image for gitfilter-repo...");
        if image.exists() {
            tracing::warn!("Disk image {} already exists. Skipping creation.", image.display());
        } else {
            exec.run(
                CommandSpec::new("hdiutil")
                    .args(["create", "-size", config.size.as_str(), "-fs", "Case-sensitive HFS+"])
                    .args(["-volname", config.volume_name.as_str()])
                    .arg(image.display().to_string()),
            )
            .await?;
        }

        tracing::info!("Mounting the case-sensitive disk image...");
        exec.run(
            CommandSpec::new("hdiutil")
                .arg("attach")
                .arg(image.display().to_string()),
        )
        .await?;
        self.mounted = Some(volume_path.clone());
        Ok(volume_path)
    }

    /// Kills whatever still uses the volume, then detaches it.
    pub async fn detach(&mut self, exec: &Executor) -> Result<()> {
        let Some(volume_path) = self.mounted.clone() else {
            return Ok(());
        };

        let pids = processes::pids_using(exec, &volume_path).await;
        if pids.is_empty() {
            tracing::info!("No processes found using {}.", volume_path.display());
        } else {
            processes::kill_all(exec, &pids).await;
        }

        tracing::info!("Unmounting the case-sensitive disk image...");
        exec.run(
            CommandSpec::new("hdiutil")
                .arg("detach")
                .arg(volume_path.display().to_string()),
        )
        .await?;
        self.mounted = None;
        Ok(())
    }
}

/// Scratch directory used by a filter-repo run, on the volume when one is configured.
pub fn scratch_dir(layout: &RepoLayout, config: &FilterRepoConfig) -> PathBuf {
    if config.use_disk_image {
        config.volume_path().join(FILTER_REPO_DIR)
    } else {
        layout.filter_repo_dir()
    }
}

/// Step 2 with git-filter-repo, on a fresh mirror in a scratch directory.
pub struct FilterRepoCleaner<'a> {
    layout: &'a RepoLayout,
    exec: &'a Executor,
    gitleaks_image: &'a str,
    config: &'a FilterRepoConfig,
    dry_run: bool,
}

impl<'a> FilterRepoCleaner<'a> {
    pub fn new(
        layout: &'a RepoLayout,
        exec: &'a Executor,
        gitleaks_image: &'a str,
        config: &'a FilterRepoConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            layout,
            exec,
            gitleaks_image,
            config,
            dry_run,
        }
    }

    /// Returns normally when the operator backs out or git-filter-repo is
    /// missing; the session goes back to the menu in both cases.
    pub async fn clean_history(&self, volume: &mut Volume) -> Result<()> {
        if self.config.use_disk_image {
            volume.attach(self.exec, self.config).await?;
        }

        let scratch = scratch_dir(self.layout, self.config);
        fs::create_dir_all(&scratch)?;

        let result = self.rewrite_in(&scratch).await;

        tracing::info!("Removing gitfilter-repo directory...");
        if let Err(e) = fs::remove_dir_all(&scratch) {
            tracing::warn!("Failed to remove {}: {}", scratch.display(), e);
        }
        if volume.is_mounted() {
            if let Err(e) = volume.detach(self.exec).await {
                // a rewrite error takes precedence
                if result.is_err() {
                    tracing::error!("Failed to unmount case-sensitive volume: {}", e);
                } else {
                    return Err(e);
                }
            }
        }
        result
    }

    async fn rewrite_in(&self, scratch: &std::path::Path) -> Result<()> {
        tracing::info!("Cloning mirror of repository");
        self.exec
            .run(
                CommandSpec::new("git")
                    .args(["clone", "--mirror"])
                    .arg(&self.layout.repo_url)
                    .current_dir(scratch),
            )
            .await?;

        let mirror = scratch.join(format!("{}.git", self.layout.repo_name));
        let secrets_path = scratch.join(SECRETS_FILE);
        let gitleaks = Gitleaks::new(self.exec, self.gitleaks_image);
        gitleaks
            .collect(&mirror, &secrets_path, &scratch.join(REPORT_FILE))
            .await?;

        tracing::info!("Review and edit secrets.txt at: {}.", secrets_path.display());
        let answer = self
            .exec
            .ask("Type 'exit' to abort or press Enter to continue... ")
            .await?;
        if answer.trim().eq_ignore_ascii_case("exit") {
            tracing::warn!("Exiting as requested by user.");
            return Ok(());
        }

        if self.exec.locate("git-filter-repo").is_none() {
            tracing::error!("git-filter-repo is not installed.");
            return Ok(());
        }

        tracing::info!("Running git-filter-repo...");
        self.exec
            .run(
                CommandSpec::new("git-filter-repo")
                    .args(["--sensitive-data-removal", "--replace-text"])
                    .arg(secrets_path.display().to_string())
                    .current_dir(&mirror),
            )
            .await?;

        history::expire_and_gc(self.exec, &mirror).await?;
        gitleaks.scan_git(&mirror, None, true).await?;
        history::force_push(self.exec, &mirror, self.dry_run).await?;
        Ok(())
    }
}
