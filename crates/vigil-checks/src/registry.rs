use crate::check::Check;
use crate::dns::DnsCheck;
use crate::github::GithubOrganizationCheck;
use std::collections::BTreeMap;
use vigil_config::{CheckEntry, CheckOptions};
use vigil_types::ids;

/// Constructs a check variant from its configuration entry.
pub type CheckFactory = fn(&CheckEntry) -> Box<dyn Check>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown check type '{check_type}' configured for check '{check_id}'")]
    UnknownCheckType {
        check_id: String,
        check_type: String,
    },
}

/// Read-only lookup table from check type id to constructor.
///
/// Built explicitly at startup and passed by reference into the runner; no
/// process-wide mutable registration. Safe for concurrent lookup.
#[derive(Clone, Debug, Default)]
pub struct CheckRegistry {
    factories: BTreeMap<&'static str, CheckFactory>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with every built-in variant.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ids::CHECK_TYPE_DNS, |entry| {
            Box::new(DnsCheck::new(entry.id.clone(), entry_options(entry)))
        });
        registry.register(ids::CHECK_TYPE_GITHUB_ORGANIZATION, |entry| {
            Box::new(GithubOrganizationCheck::new(
                entry.id.clone(),
                entry_options(entry),
            ))
        });
        registry
    }

    pub fn register(&mut self, type_id: &'static str, factory: CheckFactory) {
        self.factories.insert(type_id, factory);
    }

    /// Construct the variant named by the entry's type field.
    pub fn build(&self, entry: &CheckEntry) -> Result<Box<dyn Check>, RegistryError> {
        let factory = self.factories.get(entry.check_type.as_str()).ok_or_else(|| {
            RegistryError::UnknownCheckType {
                check_id: entry.id.clone(),
                check_type: entry.check_type.clone(),
            }
        })?;
        Ok(factory(entry))
    }

    /// Registered type identifiers, in stable order.
    pub fn type_identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}

fn entry_options(entry: &CheckEntry) -> CheckOptions {
    CheckOptions::new(entry.options.clone())
}
