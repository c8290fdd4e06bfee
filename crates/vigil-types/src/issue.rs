use serde::{Deserialize, Serialize};

/// One reported compliance deviation, produced by a check during execution.
///
/// An issue is a successful, expected output: it describes a deviation in the
/// observed external state, never a malfunction of the probe itself. Probe
/// malfunctions are reported as a [`crate::CheckFailure`] instead.
///
/// The message is rendered eagerly at construction, so an issue can always be
/// displayed without further failure modes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub check_id: String,
    pub check_type: String,
    pub message: String,
}

impl Issue {
    pub fn new(
        check_id: impl Into<String>,
        check_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            check_type: check_type.into(),
            message: message.into(),
        }
    }
}
