use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// `vigil.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so
/// forward-compat is easy. Everything a check variant understands lives in
/// the open per-entry options mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditConfigV1 {
    /// Optional schema string for tooling (`vigil.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub runner: RunnerSection,

    /// The ordered list of check blocks; report order follows this order.
    #[serde(default)]
    pub checks: Vec<CheckEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerSection {
    /// Per-check execution deadline in seconds. Default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// One entry of the declarative check list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckEntry {
    /// Unique within the run; used for report attribution.
    pub id: String,

    /// Registry key selecting the check variant.
    #[serde(rename = "type")]
    pub check_type: String,

    /// Type-specific option names to untyped values.
    #[serde(flatten)]
    pub options: BTreeMap<String, JsonValue>,
}
