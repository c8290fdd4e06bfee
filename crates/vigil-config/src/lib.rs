//! Config parsing and the typed per-check option accessor.
//!
//! This crate is intentionally IO-free: it parses and validates audit
//! configuration provided as strings. Loading the file is a CLI concern.

#![forbid(unsafe_code)]

mod model;
mod options;

pub use model::{AuditConfigV1, CheckEntry, RunnerSection};
pub use options::{CheckOptions, ConfigError};

use anyhow::bail;
use std::collections::BTreeSet;

/// Parse `vigil.toml` (or equivalent) into a typed model.
///
/// Besides shape, this enforces the list-level invariants: check ids are
/// non-empty and unique across the run, and the runner deadline is positive.
/// Per-check option *types* are deliberately not validated here; they are
/// checked lazily when a check first accesses them.
pub fn parse_config_toml(input: &str) -> anyhow::Result<AuditConfigV1> {
    let cfg: AuditConfigV1 = toml::from_str(input)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &AuditConfigV1) -> anyhow::Result<()> {
    let mut seen = BTreeSet::new();
    for entry in &cfg.checks {
        if entry.id.trim().is_empty() {
            bail!("every check entry requires a non-empty id");
        }
        if entry.check_type.trim().is_empty() {
            bail!("check '{}' requires a non-empty type", entry.id);
        }
        if !seen.insert(entry.id.as_str()) {
            bail!("duplicate check id: '{}'", entry.id);
        }
    }
    if cfg.runner.timeout_seconds == Some(0) {
        bail!("runner.timeout_seconds must be positive");
    }
    Ok(())
}
