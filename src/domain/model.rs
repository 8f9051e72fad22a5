use crate::utils::error::{CleanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub acceptable_codes: Vec<i32>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            acceptable_codes: vec![0],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn acceptable(mut self, codes: &[i32]) -> Self {
        self.acceptable_codes = codes.to_vec();
        self
    }

    pub fn accepts(&self, code: Option<i32>) -> bool {
        code.is_some_and(|c| self.acceptable_codes.contains(&c))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }
}

/// One entry of a gitleaks JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "RuleID", default)]
    pub rule_id: Option<String>,
    #[serde(rename = "File", default)]
    pub file: Option<String>,
    #[serde(rename = "Commit", default)]
    pub commit: Option<String>,
    #[serde(rename = "StartLine", default)]
    pub start_line: Option<u64>,
    #[serde(rename = "Secret", default)]
    pub secret: Option<String>,
}

/// Paths that every stage of a cleaning session agrees on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    pub repo_url: String,
    pub repo_name: String,
    pub work_dir: PathBuf,
}

impl RepoLayout {
    /// `base` is the directory the work dir is created in (normally the cwd).
    pub fn new(repo_url: &str, base: &Path) -> Result<Self> {
        let repo_name = repo_name_from_url(repo_url)?;
        let work_dir = base.join(format!("{}-gitclean", repo_name));
        Ok(Self {
            repo_url: repo_url.to_string(),
            repo_name,
            work_dir,
        })
    }

    pub fn clone_dir(&self) -> PathBuf {
        self.work_dir.join(&self.repo_name)
    }

    pub fn mirror_dir(&self) -> PathBuf {
        self.work_dir.join(format!("{}.git", self.repo_name))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.work_dir.join(format!("{}-backup.git", self.repo_name))
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.work_dir.join(SECRETS_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.work_dir.join(REPORT_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.work_dir.join("cleaner.log")
    }

    /// Scratch area for git-filter-repo when no case-sensitive volume is used.
    pub fn filter_repo_dir(&self) -> PathBuf {
        self.work_dir.join(FILTER_REPO_DIR)
    }
}

pub const SECRETS_FILE: &str = "secrets.txt";
pub const REPORT_FILE: &str = "gitleaks-report.json";
pub const FILTER_REPO_DIR: &str = "gitfilter-repo";

/// Last path segment of a clone URL without a trailing `.git`.
///
/// Local paths are canonicalized first, so `.` names the directory it points
/// at. A name that would resolve back into the work dir is rejected.
pub fn repo_name_from_url(repo_url: &str) -> Result<String> {
    let trimmed = repo_url.trim().trim_end_matches('/');
    let local = Path::new(trimmed);
    let canonical = if local.exists() {
        local.canonicalize().ok()
    } else {
        None
    };

    let last = match &canonical {
        Some(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        None => trimmed
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(trimmed)
            .to_string(),
    };
    let name = last.strip_suffix(".git").unwrap_or(&last);

    if matches!(name, "" | "." | "..") {
        return Err(CleanError::InvalidConfigValueError {
            field: "repo_url".to_string(),
            value: repo_url.to_string(),
            reason: "cannot derive a repository name from it".to_string(),
        });
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CleanHead,
    CleanHistoryBfg,
    CleanHistoryFilterRepo,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::CleanHead),
            "2" => Some(Self::CleanHistoryBfg),
            "3" => Some(Self::CleanHistoryFilterRepo),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// What to do with a local copy left over from an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingCopyAction {
    Restore,
    Discard,
    Continue,
    Exit,
}

impl ExistingCopyAction {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "restore" => Self::Restore,
            "discard" => Self::Discard,
            "exit" => Self::Exit,
            _ => Self::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_url() {
        let name = |url| repo_name_from_url(url).unwrap();
        assert_eq!(name("https://github.com/acme/app.git"), "app");
        assert_eq!(name("https://github.com/acme/app"), "app");
        assert_eq!(name("https://github.com/acme/app/"), "app");
        assert_eq!(name("git@github.com:acme/app.git"), "app");
        assert_eq!(name("git@host:app.git"), "app");
        assert_eq!(name("/srv/git/service.git"), "service");
    }

    #[test]
    fn test_dot_paths_resolve_to_the_directory_name() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let here = cwd.file_name().unwrap().to_string_lossy().into_owned();
        let here = here.strip_suffix(".git").unwrap_or(&here).to_string();
        assert_eq!(repo_name_from_url(".").unwrap(), here);
        assert_eq!(repo_name_from_url("./").unwrap(), here);

        let layout = RepoLayout::new(".", Path::new("/tmp/run")).unwrap();
        assert_eq!(layout.work_dir, PathBuf::from(format!("/tmp/run/{}-gitclean", here)));
        assert_ne!(layout.clone_dir(), layout.work_dir);

        let parent = cwd.parent().unwrap();
        match parent.file_name() {
            Some(parent_name) => {
                let parent_name = parent_name.to_string_lossy().into_owned();
                let layout = RepoLayout::new("..", Path::new("/tmp/run")).unwrap();
                assert_eq!(layout.repo_name, parent_name.strip_suffix(".git").unwrap_or(&parent_name));
                assert_ne!(layout.clone_dir(), PathBuf::from("/tmp/run"));
            }
            None => assert!(repo_name_from_url("..").is_err()),
        }
    }

    #[test]
    fn test_names_that_point_back_into_the_work_dir_are_rejected() {
        for url in ["/", "https://github.com/acme/..", "https://github.com/acme/.git", "git@host:."] {
            let err = repo_name_from_url(url).unwrap_err();
            assert!(
                matches!(err, CleanError::InvalidConfigValueError { ref field, .. } if field == "repo_url"),
                "{url}: {err:?}"
            );
            assert_eq!(err.exit_code(), 2);
        }
        assert!(RepoLayout::new("/", Path::new("/tmp/run")).is_err());
    }

    #[test]
    fn test_layout_paths() {
        let layout = RepoLayout::new("https://github.com/acme/app.git", Path::new("/tmp/run")).unwrap();
        assert_eq!(layout.work_dir, PathBuf::from("/tmp/run/app-gitclean"));
        assert_eq!(layout.clone_dir(), PathBuf::from("/tmp/run/app-gitclean/app"));
        assert_eq!(layout.mirror_dir(), PathBuf::from("/tmp/run/app-gitclean/app.git"));
        assert_eq!(
            layout.backup_dir(),
            PathBuf::from("/tmp/run/app-gitclean/app-backup.git")
        );
        assert_eq!(
            layout.secrets_path(),
            PathBuf::from("/tmp/run/app-gitclean/secrets.txt")
        );
    }

    #[test]
    fn test_command_spec_display_and_codes() {
        let spec = CommandSpec::new("git")
            .args(["push", "--force", "--all"])
            .acceptable(&[0, 1]);
        assert_eq!(spec.to_string(), "git push --force --all");
        assert!(spec.accepts(Some(1)));
        assert!(!spec.accepts(Some(2)));
        assert!(!spec.accepts(None));
    }

    #[test]
    fn test_menu_and_copy_action_parsing() {
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::CleanHistoryBfg));
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(ExistingCopyAction::parse("RESTORE"), ExistingCopyAction::Restore);
        assert_eq!(ExistingCopyAction::parse(" discard\n"), ExistingCopyAction::Discard);
        assert_eq!(ExistingCopyAction::parse(""), ExistingCopyAction::Continue);
        assert_eq!(ExistingCopyAction::parse("exit"), ExistingCopyAction::Exit);
    }

    #[test]
    fn test_finding_ignores_unknown_fields() {
        let finding: Finding = serde_json::from_str(
            r#"{"RuleID":"aws-access-token","Secret":"AKIA0000","Entropy":3.5,"Tags":[]}"#,
        )
        .unwrap();
        assert_eq!(finding.secret.as_deref(), Some("AKIA0000"));
        assert_eq!(finding.rule_id.as_deref(), Some("aws-access-token"));
        assert_eq!(finding.file, None);
    }
}
