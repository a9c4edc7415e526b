use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio_util::task::TaskTracker;

use crate::backend::{self, Invocation};
use crate::pretty;
use crate::store::ResultStore;
use crate::types::{
    BackendKind, OutcomeStatus, ScanCommand, ScanOutcome, ScanRequest, TargetClass,
};

const MAX_SCAN_WORKERS_CEILING: usize = 128;

/// One step of a composite scan plan. Steps run sequentially inside a
/// single worker; each records its own outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeStep {
    pub code: &'static str,
    pub label: &'static str,
}

/// Ordered plan for a composite scan of the given target class.
///
/// Usernames are not part of any native plan; they delegate entirely to the
/// script backend. An empty plan is a silent no-op.
pub fn composite_plan(class: TargetClass) -> Vec<CompositeStep> {
    match class {
        TargetClass::Domain => vec![
            CompositeStep { code: "dLkp", label: "DNS Lookup" },
            CompositeStep { code: "wHis", label: "WHOIS Information" },
            CompositeStep { code: "sSll", label: "SSL Certificates" },
            CompositeStep { code: "wBck", label: "Wayback Archive" },
        ],
        TargetClass::Ip => vec![CompositeStep { code: "iPlc", label: "IP Geolocation" }],
        TargetClass::Username => Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub scanner: PathBuf,
    pub script: PathBuf,
    pub interpreter: PathBuf,
    pub native_timeout: Duration,
    pub script_timeout: Duration,
    pub max_scans: usize,
    /// Pause between composite steps; bounds load on the native scanner.
    pub step_pause: Duration,
}

/// Routes accepted scan requests onto bounded, tracked worker tasks.
///
/// `dispatch` never blocks the caller: each request gets its own tokio task,
/// gated by a semaphore so a burst of commands cannot exhaust the host. The
/// tracker lets shutdown drain whatever is still in flight.
pub struct Dispatcher {
    config: DispatcherConfig,
    store: Arc<ResultStore>,
    limiter: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig, store: Arc<ResultStore>) -> Self {
        let permits = config.max_scans.clamp(1, MAX_SCAN_WORKERS_CEILING);
        log::debug!(
            "[dispatch] new: scanner={} script={} max_scans={}",
            config.scanner.display(),
            config.script.display(),
            permits
        );
        Self {
            config,
            store,
            limiter: Arc::new(Semaphore::new(permits)),
            tracker: TaskTracker::new(),
        }
    }

    /// Launch a worker for the request and return immediately.
    pub fn dispatch(&self, request: ScanRequest) {
        log::info!(
            "[dispatch] scan_started: command={} target={} backend={:?}",
            request.command.keyword(),
            request.target,
            request.backend_kind()
        );
        pretty::print_scan_started(&request);

        let config = self.config.clone();
        let store = Arc::clone(&self.store);
        let limiter = Arc::clone(&self.limiter);

        self.tracker.spawn(async move {
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };
            match request.backend_kind() {
                BackendKind::NativeSingle => {
                    let code = request
                        .command
                        .native_code()
                        .unwrap_or_else(|| request.command.keyword());
                    run_native(&config, &store, code, &request.target).await;
                }
                BackendKind::ScriptBased => {
                    run_script(&config, &store, request.command.keyword(), &request.target).await;
                }
                BackendKind::NativeComposite => {
                    run_composite(&config, &store, &request).await;
                }
            }
        });
    }

    /// Number of workers still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait up to `grace` for in-flight scans.
    /// Anything still running after the grace period is abandoned.
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            log::info!("[dispatch] shutdown_draining: in_flight={}", pending);
        }
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            log::warn!(
                "[dispatch] shutdown_abandoned: in_flight={} grace={}s",
                self.tracker.len(),
                grace.as_secs()
            );
        }
    }
}

/// One native scanner call; records, persists, and renders the outcome.
async fn run_native(config: &DispatcherConfig, store: &ResultStore, code: &str, target: &str) {
    let started_at = chrono::Utc::now();
    let args = vec![code.to_string(), target.to_string()];
    let invocation = backend::invoke(&config.scanner, &args, config.native_timeout).await;
    finish(
        store,
        build_outcome(BackendKind::NativeSingle, code, target, started_at, invocation),
    );
}

/// One advanced-scanner call via the interpreter.
async fn run_script(config: &DispatcherConfig, store: &ResultStore, command: &str, target: &str) {
    let started_at = chrono::Utc::now();
    let invocation = if config.script.exists() {
        let args = vec![
            config.script.display().to_string(),
            target.to_string(),
        ];
        backend::invoke(&config.interpreter, &args, config.script_timeout).await
    } else {
        log::warn!("[dispatch] script_missing: path={}", config.script.display());
        Invocation {
            status: OutcomeStatus::NotFound,
            stdout: String::new(),
            stderr: format!("advanced scanner not found: {}", config.script.display()),
            exit_code: None,
        }
    };
    finish(
        store,
        build_outcome(BackendKind::ScriptBased, command, target, started_at, invocation),
    );
}

/// Sequentially execute the plan for a composite request. Steps record
/// independently; a failed step does not stop the chain.
async fn run_composite(config: &DispatcherConfig, store: &ResultStore, request: &ScanRequest) {
    let Some(class) = request.command.target_class() else {
        return;
    };

    if class == TargetClass::Username {
        // Username scans delegate entirely to the script backend.
        run_script(
            config,
            store,
            ScanCommand::Advanced.keyword(),
            &request.target,
        )
        .await;
        return;
    }

    let plan = composite_plan(class);
    pretty::print_composite_started(class.as_str(), &request.target, plan.len());

    for (index, step) in plan.iter().enumerate() {
        log::info!(
            "[dispatch] composite_step: {}/{} code={} target={}",
            index + 1,
            plan.len(),
            step.code,
            request.target
        );
        let started_at = chrono::Utc::now();
        let args = vec![step.code.to_string(), request.target.to_string()];
        let invocation = backend::invoke(&config.scanner, &args, config.native_timeout).await;
        let outcome = build_outcome(
            BackendKind::NativeComposite,
            step.code,
            &request.target,
            started_at,
            invocation,
        );
        pretty::print_step_result(step.label, outcome.succeeded());
        finish(store, outcome);

        if index + 1 < plan.len() {
            sleep(config.step_pause).await;
        }
    }
}

fn build_outcome(
    backend: BackendKind,
    command: &str,
    target: &str,
    started_at: chrono::DateTime<chrono::Utc>,
    invocation: Invocation,
) -> ScanOutcome {
    let error = match invocation.status {
        OutcomeStatus::Success => None,
        OutcomeStatus::Failure => Some(match invocation.exit_code {
            Some(code) if !invocation.stderr.is_empty() => {
                format!("scanner error (code {}): {}", code, invocation.stderr)
            }
            Some(code) => format!("scanner error (code {})", code),
            None => invocation.stderr.clone(),
        }),
        OutcomeStatus::Timeout | OutcomeStatus::NotFound => Some(invocation.stderr.clone()),
    };
    ScanOutcome {
        backend,
        command: command.to_string(),
        target: target.to_string(),
        started_at,
        output: invocation.stdout,
        status: invocation.status,
        error,
        saved_to: None,
    }
}

/// Persist (successes only, like the original artifacts), record, render.
fn finish(store: &ResultStore, mut outcome: ScanOutcome) {
    if outcome.succeeded() {
        match store.persist_one(&outcome) {
            Ok(path) => {
                pretty::print_saved(&path);
                outcome.saved_to = Some(path);
            }
            Err(e) => {
                log::warn!(
                    "[dispatch] persist_failed: command={} target={} error={}",
                    outcome.command,
                    outcome.target,
                    e
                );
                pretty::print_warning(&format!("could not save results: {e}"));
            }
        }
    }
    log::info!(
        "[dispatch] scan_completed: command={} target={} status={:?}",
        outcome.command,
        outcome.target,
        outcome.status
    );
    store.record(outcome.clone());
    pretty::print_outcome(&outcome);
}
