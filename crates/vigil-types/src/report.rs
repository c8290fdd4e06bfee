use crate::Issue;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for the audit report envelope.
pub const SCHEMA_AUDIT_REPORT_V1: &str = "vigil.report.v1";

/// Why a configured check produced no issues list.
///
/// This is the closed taxonomy for everything that can go wrong around a
/// single check without aborting the rest of the run. Issues are explicitly
/// not part of it: a check that runs and finds deviations has succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckFailure {
    /// The configured `type` has no registered check variant.
    #[error("unknown check type '{check_type}'")]
    UnknownCheckType { check_type: String },

    /// Required configuration keys are absent or empty; the check was never
    /// executed.
    #[error("incomplete configuration, missing keys: {missing_keys:?}")]
    IncompleteConfiguration { missing_keys: Vec<String> },

    /// The probe itself could not complete (transport, auth, or an
    /// unsupported value in configuration or response).
    #[error("execution failed: {cause}")]
    ExecutionFailure { cause: String },

    /// The runner's per-check deadline expired before the probe returned.
    #[error("execution exceeded the {seconds}s deadline")]
    Timeout { seconds: u64 },
}

/// The outcome slot for one configured check entry.
///
/// Exactly one outcome exists per entry, in configuration order, regardless
/// of whether the check succeeded, found nothing, or failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check_id: String,
    pub check_type: String,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CheckFailure>,
}

impl CheckOutcome {
    pub fn completed(
        check_id: impl Into<String>,
        check_type: impl Into<String>,
        issues: Vec<Issue>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            check_type: check_type.into(),
            issues,
            failure: None,
        }
    }

    pub fn failed(
        check_id: impl Into<String>,
        check_type: impl Into<String>,
        failure: CheckFailure,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            check_type: check_type.into(),
            issues: Vec::new(),
            failure: Some(failure),
        }
    }

    /// True when the check executed and found no deviations.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.failure.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `Fail` iff any outcome carries issues or a failure.
    pub fn from_outcomes(outcomes: &[CheckOutcome]) -> Self {
        if outcomes.iter().all(CheckOutcome::is_clean) {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// The completed audit report for one run.
///
/// The runner always finishes and returns a full report; consumers derive
/// success or failure presentation (exit codes, alerts) from its content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub duration_ms: u64,
    pub verdict: Verdict,
    pub outcomes: Vec<CheckOutcome>,
}
