use eyre::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::types::OutcomeStatus;

/// Captured result of one child-process invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub status: OutcomeStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl Invocation {
    fn not_found(detail: String) -> Self {
        Self {
            status: OutcomeStatus::NotFound,
            stdout: String::new(),
            stderr: detail,
            exit_code: None,
        }
    }

    fn failure(detail: String, exit_code: Option<i32>) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            stdout: String::new(),
            stderr: detail,
            exit_code,
        }
    }
}

/// Launch `program` with `args`, wait up to `timeout`, and capture both
/// output streams. The child is spawned with `kill_on_drop`, so a timed-out
/// process is reaped rather than leaked.
///
/// Classification:
/// - exit 0 -> Success (empty stdout is still success)
/// - non-zero exit -> Failure, detail = captured stderr
/// - deadline exceeded -> Timeout, child killed
/// - missing executable -> NotFound
pub async fn invoke(program: &Path, args: &[String], timeout: Duration) -> Invocation {
    log::debug!(
        "[backend] invoke: program={} args={:?} timeout={}s",
        program.display(),
        args,
        timeout.as_secs()
    );

    // A path with separators that points at nothing can be rejected before
    // spawning; bare names are left to PATH lookup.
    if program.components().count() > 1 && !program.exists() {
        log::warn!("[backend] not_found: program={}", program.display());
        return Invocation::not_found(format!("executable not found: {}", program.display()));
    }

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("[backend] not_found: program={}", program.display());
            return Invocation::not_found(format!(
                "executable not found: {}",
                program.display()
            ));
        }
        Err(e) => {
            log::error!(
                "[backend] spawn_failed: program={} error={}",
                program.display(),
                e
            );
            return Invocation::failure(format!("failed to launch {}: {}", program.display(), e), None);
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let exit_code = output.status.code();
            let status = if output.status.success() {
                OutcomeStatus::Success
            } else {
                OutcomeStatus::Failure
            };
            log::debug!(
                "[backend] completed: program={} exit_code={:?} status={:?} stdout_len={}",
                program.display(),
                exit_code,
                status,
                stdout.len()
            );
            Invocation {
                status,
                stdout,
                stderr,
                exit_code,
            }
        }
        Ok(Err(e)) => {
            log::error!(
                "[backend] wait_failed: program={} error={}",
                program.display(),
                e
            );
            Invocation::failure(format!("wait failed for {}: {}", program.display(), e), None)
        }
        Err(_) => {
            // Dropping the output future drops the child; kill_on_drop reaps it.
            log::warn!(
                "[backend] timeout: program={} timeout={}s",
                program.display(),
                timeout.as_secs()
            );
            Invocation {
                status: OutcomeStatus::Timeout,
                stdout: String::new(),
                stderr: format!("timed out after {}s", timeout.as_secs()),
                exit_code: None,
            }
        }
    }
}

/// Which backends are usable this session.
#[derive(Debug, Clone, Copy)]
pub struct Availability {
    pub native: bool,
    pub script: bool,
}

impl Availability {
    pub fn any(&self) -> bool {
        self.native || self.script
    }
}

/// Probe both backends before the interactive loop starts.
///
/// The native scanner is considered healthy when its `help` subcommand exits
/// with code 0 or 1 (1 is the scanners' soft/usage failure). The script
/// backend only needs the script file plus a resolvable interpreter.
pub async fn probe(
    scanner: &Path,
    interpreter: &Path,
    script: &Path,
    timeout: Duration,
) -> Result<Availability> {
    let native = if scanner.exists() {
        let inv = invoke(scanner, &["help".to_string()], timeout).await;
        matches!(inv.exit_code, Some(0) | Some(1))
    } else {
        false
    };

    let script_ok = script.exists() && interpreter_resolves(interpreter);

    log::info!(
        "[backend] probe: native={} script={} scanner={} script_path={}",
        native,
        script_ok,
        scanner.display(),
        script.display()
    );

    Ok(Availability {
        native,
        script: script_ok,
    })
}

fn interpreter_resolves(interpreter: &Path) -> bool {
    if interpreter.components().count() > 1 {
        return interpreter.exists();
    }
    // Bare name: walk PATH the way the shell would.
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| dir.join(interpreter).is_file())
}
