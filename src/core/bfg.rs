use crate::config::toml_config::BfgConfig;
use crate::core::executor::Executor;
use crate::core::gitleaks::Gitleaks;
use crate::core::history;
use crate::domain::model::{CommandSpec, RepoLayout};
use crate::utils::error::{CleanError, Result};
use std::path::{Path, PathBuf};

const PROTECTED_COMMITS_URL: &str = "https://rtyley.github.io/bfg-repo-cleaner/#protected-commits";

/// Picks the BFG jar: an explicit path, else the cached download, else a
/// fresh download into the cache directory.
pub async fn resolve_jar(explicit: Option<&Path>, config: &BfgConfig) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let cache_dir = config.cache_dir()?;
    std::fs::create_dir_all(&cache_dir)?;
    let local_path = cache_dir.join(&config.jar_name);

    if local_path.exists() {
        tracing::info!("BFG already downloaded at {}", local_path.display());
        return Ok(local_path);
    }

    tracing::info!("Downloading BFG Repo-Cleaner from {}", config.url);
    download(&config.url, &local_path).await?;
    tracing::info!("[SUCCESS] Downloaded BFG to {}", local_path.display());
    Ok(local_path)
}

pub async fn download(url: &str, dest: &Path) -> Result<()> {
    let failed = |message: String| CleanError::DownloadFailed {
        url: url.to_string(),
        message,
    };

    let response = reqwest::get(url).await.map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    // write under a temporary name so an interrupted download is never cached
    let partial = dest.with_extension("part");
    std::fs::write(&partial, &bytes)?;
    std::fs::rename(&partial, dest)?;
    Ok(())
}

/// Step 2 with BFG Repo-Cleaner, run against the mirror clone.
pub struct BfgCleaner<'a> {
    layout: &'a RepoLayout,
    exec: &'a Executor,
    gitleaks_image: &'a str,
    jar: &'a Path,
    dry_run: bool,
}

impl<'a> BfgCleaner<'a> {
    pub fn new(
        layout: &'a RepoLayout,
        exec: &'a Executor,
        gitleaks_image: &'a str,
        jar: &'a Path,
        dry_run: bool,
    ) -> Self {
        Self {
            layout,
            exec,
            gitleaks_image,
            jar,
            dry_run,
        }
    }

    fn bfg(&self, protect_blobs: bool) -> CommandSpec {
        let mut spec = CommandSpec::new("java")
            .arg("-jar")
            .arg(self.jar.display().to_string())
            .arg("--replace-text")
            .arg(self.layout.secrets_path().display().to_string());
        if !protect_blobs {
            spec = spec.arg("--no-blob-protection");
        }
        spec.arg(self.layout.mirror_dir().display().to_string())
            .current_dir(&self.layout.work_dir)
    }

    pub async fn clean_history(&self) -> Result<()> {
        let mirror = self.layout.mirror_dir();
        let gitleaks = Gitleaks::new(self.exec, self.gitleaks_image);
        let secrets_path = self.layout.secrets_path();

        gitleaks
            .collect(&mirror, &secrets_path, &self.layout.report_path())
            .await?;

        tracing::info!(
            "Review and edit secrets.txt at: {}. For details, refer to gitleaks-report.json in same folder",
            secrets_path.display()
        );
        tracing::info!("Remove any false positives you do NOT want BFG to replace.");
        self.exec
            .pause_unless_exit(
                "Type 'exit' to abort or Press Enter to start removal process AFTER reviewing secrets.txt...",
                "BFG secrets review",
            )
            .await?;

        self.exec.run(self.bfg(true)).await?;
        history::expire_and_gc(self.exec, &mirror).await?;
        gitleaks.scan_git(&mirror, None, true).await?;

        tracing::warn!(
            "If gitleaks still reports secrets (other than false positives) you can run a hard \
             cleaning with --no-blob-protection. BFG will then also modify the contents of current \
             commits. Ideally fix the working copy and commit that first (Step 1), check the build \
             still works, and only then clean history. Read more: {}",
            PROTECTED_COMMITS_URL
        );

        if self
            .exec
            .confirm("The final push will still ask for confirmation. Do you want to proceed with hard cleaning?")
            .await?
        {
            self.exec.run(self.bfg(false)).await?;
            history::expire_and_gc(self.exec, &mirror).await?;
            gitleaks.scan_git(&mirror, None, false).await?;
        } else {
            tracing::warn!("[SKIPPED] Skipping hard cleaning with --no-blob-protection flag.");
        }

        history::force_push(self.exec, &mirror, self.dry_run).await?;
        Ok(())
    }
}
