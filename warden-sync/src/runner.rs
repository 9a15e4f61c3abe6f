//! Collaborator script execution.
//!
//! Every domain sync procedure is an external process invoked as
//! `<runtime> <script path> [<action>]` under a hard wall-clock timeout.
//! Failures — missing interpreter, non-zero exit, timeout — are converted
//! into a failed [`RunOutcome`] rather than propagated, so one script cannot
//! abort the orchestrator.
//!
//! The [`ScriptRunner`] trait is the collaborator boundary: production code
//! uses [`ProcessRunner`]; tests substitute recording doubles.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use warden_core::RepoConfig;

/// Wall-clock limit for one domain sync script.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters of stderr/stdout kept as the failure diagnostic.
pub const DIAGNOSTIC_LIMIT: usize = 200;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Outcome of one script invocation. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
    pub duration: Duration,
}

impl RunOutcome {
    fn failure(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            message: message.into(),
            duration,
        }
    }
}

/// Boundary to the external sync procedures.
pub trait ScriptRunner {
    /// Run `script` with an optional action argument, bounded by `timeout`.
    fn run(&self, script: &Path, action: Option<&str>, timeout: Duration) -> RunOutcome;
}

/// Runs scripts as `<runtime> <script> [<action>]` with the repository root
/// as working directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    runtime: String,
    cwd: PathBuf,
}

impl ProcessRunner {
    pub fn new(config: &RepoConfig) -> Self {
        Self {
            runtime: config.runtime.clone(),
            cwd: config.root.clone(),
        }
    }
}

impl ScriptRunner for ProcessRunner {
    fn run(&self, script: &Path, action: Option<&str>, timeout: Duration) -> RunOutcome {
        let started = Instant::now();

        let mut command = Command::new(&self.runtime);
        command
            .arg(script)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(action) = action {
            command.arg(action);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return RunOutcome::failure(
                    format!("failed to spawn {}: {err}", self.runtime),
                    started.elapsed(),
                )
            }
        };

        // Drain both pipes on threads so a chatty script cannot deadlock
        // against a full pipe buffer while we poll for exit.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match wait_with_deadline(&mut child, timeout) {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                // Join the readers so the threads do not outlive the call.
                let _ = stdout.join();
                let _ = stderr.join();
                return RunOutcome::failure(
                    format!("timeout after {}s", timeout.as_secs()),
                    started.elapsed(),
                );
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        let duration = started.elapsed();

        if status.success() {
            return RunOutcome {
                success: true,
                message: "Success".to_string(),
                duration,
            };
        }

        let diagnostic = if stderr.trim().is_empty() {
            truncate(&stdout)
        } else {
            truncate(&stderr)
        };
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        RunOutcome::failure(format!("exit {code}: {diagnostic}"), duration)
    }
}

/// Poll `try_wait` until exit or deadline; `None` means the deadline passed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                log::warn!("try_wait failed: {err}");
                return None;
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}

fn truncate(text: &str) -> String {
    text.trim().chars().take(DIAGNOSTIC_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sh_runner(root: &Path) -> ProcessRunner {
        ProcessRunner::new(&RepoConfig::new(root).with_runtime("sh"))
    }

    fn write_script(root: &Path, name: &str, body: &str) -> PathBuf {
        let path = root.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn successful_script_reports_success() {
        let tmp = TempDir::new().unwrap();
        let script = write_script(tmp.path(), "ok.sh", "exit 0\n");

        let outcome = sh_runner(tmp.path()).run(&script, None, SCRIPT_TIMEOUT);
        assert!(outcome.success);
        assert_eq!(outcome.message, "Success");
    }

    #[test]
    fn action_is_passed_as_first_argument() {
        let tmp = TempDir::new().unwrap();
        let script = write_script(
            tmp.path(),
            "args.sh",
            "[ \"$1\" = \"full-sync\" ] && exit 0 || exit 7\n",
        );

        let runner = sh_runner(tmp.path());
        assert!(runner.run(&script, Some("full-sync"), SCRIPT_TIMEOUT).success);
        assert!(!runner.run(&script, None, SCRIPT_TIMEOUT).success);
    }

    #[test]
    fn failing_script_captures_truncated_stderr() {
        let tmp = TempDir::new().unwrap();
        let long = "e".repeat(500);
        let script = write_script(
            tmp.path(),
            "fail.sh",
            &format!("echo {long} >&2\nexit 3\n"),
        );

        let outcome = sh_runner(tmp.path()).run(&script, None, SCRIPT_TIMEOUT);
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("exit 3: "));
        let diagnostic = outcome.message.trim_start_matches("exit 3: ");
        assert_eq!(diagnostic.len(), DIAGNOSTIC_LIMIT);
    }

    #[test]
    fn stdout_is_the_diagnostic_when_stderr_is_empty() {
        let tmp = TempDir::new().unwrap();
        let script = write_script(tmp.path(), "out.sh", "echo oops on stdout\nexit 1\n");

        let outcome = sh_runner(tmp.path()).run(&script, None, SCRIPT_TIMEOUT);
        assert_eq!(outcome.message, "exit 1: oops on stdout");
    }

    #[test]
    fn script_exceeding_deadline_is_killed_and_reported() {
        let tmp = TempDir::new().unwrap();
        let script = write_script(tmp.path(), "slow.sh", "sleep 30\n");

        let outcome = sh_runner(tmp.path()).run(&script, None, Duration::from_millis(200));
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("timeout after"));
        assert!(outcome.duration < Duration::from_secs(10));
    }

    #[test]
    fn missing_interpreter_is_a_failed_outcome_not_a_panic() {
        let tmp = TempDir::new().unwrap();
        let script = write_script(tmp.path(), "ok.sh", "exit 0\n");
        let runner = ProcessRunner::new(
            &RepoConfig::new(tmp.path()).with_runtime("definitely-not-an-interpreter"),
        );

        let outcome = runner.run(&script, None, SCRIPT_TIMEOUT);
        assert!(!outcome.success);
        assert!(outcome.message.contains("failed to spawn"));
    }
}
