use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};
use vigil_checks::{Check, CheckRegistry, ExecuteError, RegistryError};
use vigil_config::CheckEntry;
use vigil_types::{
    AuditReport, CheckFailure, CheckOutcome, Issue, ToolMeta, Verdict, SCHEMA_AUDIT_REPORT_V1,
};

/// Runner-level policy. Variants stay uniform: the deadline is imposed here,
/// not inside each check.
#[derive(Clone, Debug)]
pub struct RunnerOptions {
    /// Wall-clock deadline per `execute` call.
    pub timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Run every configured entry, in configuration order, and assemble the
/// report envelope.
///
/// The runner always completes: registry misses, incomplete configuration,
/// probe failures, deadline expiry, and even a panicking check are recorded
/// in that entry's outcome slot and evaluation moves on. Exit-code and
/// rendering decisions belong to the caller.
pub fn run_audit(
    entries: &[CheckEntry],
    registry: &CheckRegistry,
    options: &RunnerOptions,
) -> AuditReport {
    let started_at = OffsetDateTime::now_utc();

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        outcomes.push(run_entry(entry, registry, options));
    }

    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;
    let verdict = Verdict::from_outcomes(&outcomes);

    AuditReport {
        schema: SCHEMA_AUDIT_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "vigil".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        duration_ms,
        verdict,
        outcomes,
    }
}

/// Map verdict to exit code: 0 = pass, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail => 2,
    }
}

fn run_entry(entry: &CheckEntry, registry: &CheckRegistry, options: &RunnerOptions) -> CheckOutcome {
    let check = match registry.build(entry) {
        Ok(check) => check,
        Err(RegistryError::UnknownCheckType { check_type, .. }) => {
            warn!(check_id = %entry.id, check_type = %check_type, "unknown check type");
            return CheckOutcome::failed(
                entry.id.as_str(),
                entry.check_type.as_str(),
                CheckFailure::UnknownCheckType { check_type },
            );
        }
    };

    let missing_keys = check.missing_keys();
    if !missing_keys.is_empty() {
        warn!(check_id = %entry.id, ?missing_keys, "incomplete configuration, skipping execution");
        return CheckOutcome::failed(
            entry.id.as_str(),
            entry.check_type.as_str(),
            CheckFailure::IncompleteConfiguration { missing_keys },
        );
    }

    debug!(check_id = %entry.id, check_type = %entry.check_type, "executing check");
    match execute_with_deadline(check, options.timeout) {
        Execution::Completed(Ok(issues)) => CheckOutcome::completed(entry.id.as_str(), entry.check_type.as_str(), issues),
        Execution::Completed(Err(err)) => {
            warn!(check_id = %entry.id, error = %err, "check execution failed");
            CheckOutcome::failed(
                entry.id.as_str(),
                entry.check_type.as_str(),
                CheckFailure::ExecutionFailure {
                    cause: err.to_string(),
                },
            )
        }
        Execution::TimedOut => {
            warn!(check_id = %entry.id, timeout_s = options.timeout.as_secs(), "check timed out");
            CheckOutcome::failed(
                entry.id.as_str(),
                entry.check_type.as_str(),
                CheckFailure::Timeout {
                    seconds: options.timeout.as_secs(),
                },
            )
        }
        Execution::Panicked => CheckOutcome::failed(
            entry.id.as_str(),
            entry.check_type.as_str(),
            CheckFailure::ExecutionFailure {
                cause: "check execution panicked".to_string(),
            },
        ),
    }
}

enum Execution {
    Completed(Result<Vec<Issue>, ExecuteError>),
    TimedOut,
    Panicked,
}

/// Execute on a worker thread and wait for at most `timeout`.
///
/// A worker that misses its deadline keeps running detached until it
/// finishes or the process exits; its eventual result is discarded.
fn execute_with_deadline(check: Box<dyn Check>, timeout: Duration) -> Execution {
    let (tx, rx) = mpsc::channel();
    let name = format!("check-{}", check.check_id());
    let spawned = thread::Builder::new().name(name).spawn(move || {
        let _ = tx.send(check.execute());
    });
    if let Err(err) = spawned {
        return Execution::Completed(Err(ExecuteError::Probe(vigil_checks::ProbeError(
            format!("failed to spawn check worker: {err}"),
        ))));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => Execution::Completed(result),
        Err(RecvTimeoutError::Timeout) => Execution::TimedOut,
        // Sender dropped without a result: the check panicked.
        Err(RecvTimeoutError::Disconnected) => Execution::Panicked,
    }
}
