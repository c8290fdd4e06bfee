//! Stable DTOs and IDs used across the vigil workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted audit report
//! - the closed per-check failure taxonomy
//! - stable string ids for the built-in check types

#![forbid(unsafe_code)]

pub mod ids;
pub mod issue;
pub mod report;

pub use issue::Issue;
pub use report::{
    AuditReport, CheckFailure, CheckOutcome, ToolMeta, Verdict, SCHEMA_AUDIT_REPORT_V1,
};
