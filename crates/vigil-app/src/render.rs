use std::fmt::Write as _;
use vigil_types::{AuditReport, Verdict};

/// Render the report as a human-readable text summary.
///
/// One block per outcome, in report order, followed by a totals line. JSON
/// is the machine surface; this is for terminals and run logs.
pub fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let status = if let Some(failure) = &outcome.failure {
            format!("FAILED: {failure}")
        } else if outcome.issues.is_empty() {
            "ok".to_string()
        } else {
            format!("{} issue(s)", outcome.issues.len())
        };
        let _ = writeln!(
            out,
            "[{}] {}: {}",
            outcome.check_type, outcome.check_id, status
        );
        for issue in &outcome.issues {
            let _ = writeln!(out, "  - {}", issue.message);
        }
    }

    let issues: usize = report.outcomes.iter().map(|o| o.issues.len()).sum();
    let failures = report
        .outcomes
        .iter()
        .filter(|o| o.failure.is_some())
        .count();
    let verdict = match report.verdict {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
    };
    let _ = writeln!(
        out,
        "{}: {} checks, {} issues, {} failures ({} ms)",
        verdict,
        report.outcomes.len(),
        issues,
        failures,
        report.duration_ms
    );

    out
}
