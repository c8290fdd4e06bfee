//! Audit orchestration: turn a configured check list into a completed
//! report, one isolated outcome per entry.

#![forbid(unsafe_code)]

mod render;
mod runner;

pub use render::render_text;
pub use runner::{run_audit, verdict_exit_code, RunnerOptions};
