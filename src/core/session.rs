use crate::config::toml_config::ToolConfig;
use crate::core::bfg::{self, BfgCleaner};
use crate::core::dependencies::check_dependencies;
use crate::core::executor::Executor;
use crate::core::filter_repo::{self, FilterRepoCleaner, Volume};
use crate::core::head_cleaner::HeadCleaner;
use crate::core::workspace::Workspace;
use crate::domain::model::{MenuChoice, RepoLayout};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const BANNER: &str = concat!(
    "gitclean v",
    env!("CARGO_PKG_VERSION"),
    "\nA CLI tool for cleaning git repositories that may contain sensitive information such as API keys, passwords, or other secrets.",
    "\nhttps://github.com/shrish-nitb/gitclean",
    "\nFor help run gitclean --help"
);

/// One interactive cleaning run against a single repository.
pub struct GitCleanSession {
    layout: RepoLayout,
    tools: ToolConfig,
    exec: Executor,
    dry_run: bool,
    bfg_jar: Option<PathBuf>,
    volume: Volume,
}

impl GitCleanSession {
    pub fn new(
        layout: RepoLayout,
        tools: ToolConfig,
        exec: Executor,
        dry_run: bool,
        bfg_jar: Option<PathBuf>,
    ) -> Self {
        Self {
            layout,
            tools,
            exec,
            dry_run,
            bfg_jar,
            volume: Volume::default(),
        }
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn volume_mut(&mut self) -> &mut Volume {
        &mut self.volume
    }

    /// Preflight, workspace preparation, then the menu until the operator exits.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            "Starting gitclean for repository: {}, working in {}",
            self.layout.repo_url,
            self.layout.work_dir.display()
        );
        if self.dry_run {
            tracing::info!("[DRY RUN] Nothing will be committed or pushed");
        }

        check_dependencies(&self.exec).await?;
        Workspace::new(&self.layout, &self.exec).prepare().await?;

        let jar = bfg::resolve_jar(self.bfg_jar.as_deref(), &self.tools.bfg).await?;
        self.menu_loop(&jar).await
    }

    pub async fn menu_loop(&mut self, jar: &Path) -> Result<()> {
        loop {
            tracing::info!("==== Main Menu ====");
            tracing::info!("1. Clean HEAD of important branches like release, master etc (Step 1)");
            tracing::info!("2. Clean commit history using BFG Repo-Cleaner (Step 2)");
            tracing::info!("3. Clean commit history using git-filter-repo (Step 2)");
            tracing::info!("4. Exit");

            let answer = self.exec.ask("Enter your choice (1/2/3/4): ").await?;
            let image = self.tools.gitleaks.image.as_str();

            match MenuChoice::parse(&answer) {
                Some(MenuChoice::CleanHead) => {
                    HeadCleaner::new(&self.layout, &self.exec, image, self.dry_run)
                        .run()
                        .await?;
                }
                Some(MenuChoice::CleanHistoryBfg) => {
                    tracing::info!("Starting commit history cleaning");
                    BfgCleaner::new(&self.layout, &self.exec, image, jar, self.dry_run)
                        .clean_history()
                        .await?;
                }
                Some(MenuChoice::CleanHistoryFilterRepo) => {
                    tracing::info!("Starting commit history cleaning");
                    FilterRepoCleaner::new(
                        &self.layout,
                        &self.exec,
                        image,
                        &self.tools.filter_repo,
                        self.dry_run,
                    )
                    .clean_history(&mut self.volume)
                    .await?;
                }
                Some(MenuChoice::Exit) => {
                    tracing::info!("Exiting gitclean");
                    return Ok(());
                }
                None => tracing::warn!("Invalid choice. Please select 1, 2, 3, or 4."),
            }
        }
    }

    /// Always runs, whatever ended the session. Failures are logged only.
    pub async fn shutdown(&mut self) {
        tracing::info!("Gracefully shutting down gitclean...");

        let scratch = filter_repo::scratch_dir(&self.layout, &self.tools.filter_repo);
        if scratch.exists() {
            tracing::info!("Removing gitfilter-repo directory...");
            if let Err(e) = std::fs::remove_dir_all(&scratch) {
                tracing::warn!("Failed to remove gitfilter-repo directory: {}", e);
            }
        }

        if let Some(mount_point) = self.volume.mount_point().cloned() {
            if let Err(e) = self.volume.detach(&self.exec).await {
                tracing::error!("Failed to unmount {}: {}", mount_point.display(), e);
            }
        }
    }
}
