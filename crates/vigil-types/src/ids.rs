//! Stable identifiers for the built-in check types.
//!
//! A check type id is the registry key that configuration entries reference
//! in their `type` field.

pub const CHECK_TYPE_DNS: &str = "dns";
pub const CHECK_TYPE_GITHUB_ORGANIZATION: &str = "github_organization";
