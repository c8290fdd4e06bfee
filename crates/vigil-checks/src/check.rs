use vigil_config::{CheckOptions, ConfigError};
use vigil_types::Issue;

/// A probe's own infrastructure failed: transport, auth, or an unusable
/// response. Never a compliance finding.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

/// Everything `execute` can fail with.
///
/// All variants surface in the report as an execution failure attributed to
/// the check; none of them aborts the rest of the run.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// A configuration value had the wrong shape, discovered lazily at
    /// access time inside `execute`.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A value in configuration or response that the variant cannot
    /// interpret (e.g. an unrecognized record type).
    #[error("{0}")]
    UnsupportedValue(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// The polymorphic unit of work.
///
/// One instance corresponds to one configured entry. The runner asks for
/// configuration completeness exactly once before `execute`, and `execute`
/// is invoked at most once per instance. Implementations must not retry
/// internally; a single probe failure is reported as-is.
///
/// `Send` is required so the runner can impose its deadline by executing the
/// check on a worker thread.
pub trait Check: Send {
    /// Stable identifier from configuration, used in reporting.
    fn check_id(&self) -> &str;

    /// Stable string naming the variant; the registry key.
    fn type_identifier(&self) -> &'static str;

    /// The option keys this variant cannot run without.
    fn required_keys(&self) -> &'static [&'static str];

    /// This check's validated configuration slice.
    fn options(&self) -> &CheckOptions;

    /// Observe external state and report deviations.
    ///
    /// A successful run with zero issues is the happy path, not an error.
    fn execute(&self) -> Result<Vec<Issue>, ExecuteError>;

    /// Required keys that are absent or empty in the configuration.
    fn missing_keys(&self) -> Vec<String> {
        self.options().missing_keys(self.required_keys())
    }

    fn is_configuration_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }
}
