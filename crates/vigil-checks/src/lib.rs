//! The polymorphic check contract, the registry, and the built-in variants.
//!
//! A check is a self-contained probe: it validates its own configuration,
//! observes one piece of external state, and reports deviations as issues.
//! The runner in `vigil-app` owns dispatch, isolation, and deadlines.

#![forbid(unsafe_code)]

mod check;
mod dns;
mod github;
mod registry;

pub use check::{Check, ExecuteError, ProbeError};
pub use dns::{DnsCheck, DnsLookup, LookupOutcome, RecordData, RecordKind, ResolverLookup};
pub use github::{GithubDirectory, GithubOrganizationCheck, OrgDirectory};
pub use registry::{CheckFactory, CheckRegistry, RegistryError};
