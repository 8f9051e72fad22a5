#![allow(dead_code)]

use gitclean::config::toml_config::ToolConfig;
use gitclean::domain::model::{repo_name_from_url, CommandSpec, REPORT_FILE};
use gitclean::{Executor, RecordingRunner, ScriptedPrompt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const REPO_URL: &str = "https://github.com/acme/payments.git";

pub const REPORT: &str = r#"[
    {"RuleID": "stripe-access-token", "File": "settings.py", "Commit": "9f1c", "StartLine": 12, "Secret": "sk_live_FAKEKEY0000000000000"},
    {"RuleID": "generic-api-key", "File": "deploy.sh", "Commit": "77aa", "StartLine": 3, "Secret": "hunter2-api-key"},
    {"RuleID": "generic-api-key", "File": "deploy.sh", "Commit": "12bb", "StartLine": 3, "Secret": "hunter2-api-key"}
]"#;

pub fn executor(runner: &RecordingRunner, answers: &[&str]) -> (Executor, Arc<ScriptedPrompt>) {
    let prompt = Arc::new(ScriptedPrompt::new(answers.iter().copied()));
    (Executor::new(Arc::new(runner.clone()), prompt.clone()), prompt)
}

/// Host path mounted at `/repo` by a gitleaks `docker run`.
pub fn mounted_path(spec: &CommandSpec) -> Option<PathBuf> {
    spec.args
        .iter()
        .find_map(|a| a.strip_suffix(":/repo"))
        .map(PathBuf::from)
}

/// Makes `git clone` create the directory real git would, and gitleaks
/// report runs write `REPORT` into the scanned repository.
pub fn fake_host(runner: &RecordingRunner) {
    runner.on_command(|spec| {
        if spec.program == "git" && spec.args.first().map(String::as_str) == Some("clone") {
            let cwd = spec.cwd.clone().unwrap_or_default();
            let url = spec.args.last().cloned().unwrap_or_default();
            let name = repo_name_from_url(&url).expect("clone url names a repository");
            if spec.args.iter().any(|a| a == "--mirror") {
                let mirror = cwd.join(format!("{}.git", name));
                fs::create_dir_all(mirror.join("refs/heads")).ok();
                fs::write(mirror.join("HEAD"), "ref: refs/heads/main\n").ok();
            } else {
                fs::create_dir_all(cwd.join(&name).join(".git")).ok();
            }
        }
        if spec.program == "docker" && spec.args.iter().any(|a| a == "-f=json") {
            if let Some(repo) = mounted_path(spec) {
                fs::write(repo.join(REPORT_FILE), REPORT).ok();
            }
        }
        None
    });
}

pub fn tool_config(cache_dir: &Path) -> ToolConfig {
    let mut tools = ToolConfig::default();
    tools.bfg.cache_dir = Some(cache_dir.to_path_buf());
    tools.filter_repo.use_disk_image = false;
    tools
}

pub fn fake_jar(dir: &Path) -> PathBuf {
    let jar = dir.join("bfg-1.14.0.jar");
    fs::write(&jar, b"PK\x03\x04").unwrap();
    jar
}

pub fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no command containing {needle:?} in {lines:#?}"))
}
