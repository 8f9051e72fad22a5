use crate::core::executor::Executor;
use crate::domain::model::CommandSpec;
use std::collections::BTreeSet;
use std::path::Path;

/// Parses `lsof -t` output: one pid per line.
pub fn parse_pids(output: &str) -> BTreeSet<u32> {
    output
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// Pids holding files open under `path` or running with a cwd inside it,
/// never including this process.
pub async fn pids_using(exec: &Executor, path: &Path) -> BTreeSet<u32> {
    let mut pids = BTreeSet::new();

    let lsof = CommandSpec::new("lsof")
        .args(["-t", "+D"])
        .arg(path.display().to_string());
    match exec.capture(lsof).await {
        Ok(outcome) => {
            pids.extend(parse_pids(&outcome.stdout));
            // lsof exits 1 when nothing matched
            if outcome.code.is_some_and(|code| code > 1) {
                tracing::error!("lsof error: {}", outcome.stderr.trim());
            }
        }
        Err(e) => tracing::error!("Unexpected error running lsof: {}", e),
    }

    pids.extend(processes_with_cwd_under(path));
    pids.remove(&std::process::id());
    pids
}

#[cfg(feature = "cli")]
fn processes_with_cwd_under(path: &Path) -> BTreeSet<u32> {
    use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cwd(UpdateKind::Always),
    );

    system
        .processes()
        .iter()
        .filter(|(_, process)| process.cwd().is_some_and(|cwd| cwd.starts_with(path)))
        .map(|(pid, _)| pid.as_u32())
        .collect()
}

#[cfg(not(feature = "cli"))]
fn processes_with_cwd_under(_path: &Path) -> BTreeSet<u32> {
    BTreeSet::new()
}

/// Sends SIGKILL to every pid. Processes that already exited are not an error.
#[cfg(feature = "cli")]
pub async fn kill_all(_exec: &Executor, pids: &BTreeSet<u32>) {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

    let targets: Vec<Pid> = pids.iter().map(|pid| Pid::from_u32(*pid)).collect();
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&targets),
        true,
        ProcessRefreshKind::nothing(),
    );

    for pid in targets {
        match system.process(pid).map(|p| p.kill_with(Signal::Kill)) {
            None => tracing::info!("Process {} no longer exists", pid),
            Some(Some(true)) => tracing::info!("Killed process {}", pid),
            Some(_) => tracing::warn!("No permission to kill process {}", pid),
        }
    }
}

#[cfg(not(feature = "cli"))]
pub async fn kill_all(exec: &Executor, pids: &BTreeSet<u32>) {
    for pid in pids {
        let spec = CommandSpec::new("kill").arg("-9").arg(pid.to_string());
        match exec.capture(spec).await {
            Ok(outcome) if outcome.code == Some(0) => tracing::info!("Killed process {}", pid),
            Ok(outcome) => tracing::warn!("Could not kill process {}: {}", pid, outcome.stderr.trim()),
            Err(e) => tracing::warn!("Could not kill process {}: {}", pid, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{RecordingRunner, ScriptedPrompt};
    use crate::domain::model::CommandOutcome;
    use std::sync::Arc;

    #[test]
    fn test_parse_pids_ignores_noise() {
        let pids = parse_pids("123\n456\n\nnot-a-pid\n123\n");
        assert_eq!(pids.into_iter().collect::<Vec<_>>(), vec![123, 456]);
    }

    #[tokio::test]
    async fn test_pids_using_excludes_current_process() {
        let me = std::process::id();
        let runner = RecordingRunner::new();
        runner.respond(
            "lsof",
            CommandOutcome {
                code: Some(0),
                stdout: format!("{}\n4242\n", me),
                stderr: String::new(),
            },
        );
        let exec = Executor::new(Arc::new(runner.clone()), Arc::new(ScriptedPrompt::default()));

        let dir = tempfile::TempDir::new().unwrap();
        let pids = pids_using(&exec, dir.path()).await;
        assert!(pids.contains(&4242));
        assert!(!pids.contains(&me));
        assert!(runner.ran("lsof -t +D"));
    }
}
