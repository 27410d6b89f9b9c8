//! Configuration session phases.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    Success,
    Failure,
}

/// Where a configuration session stands.
///
/// `NoDevice → DeviceSelected → TaskTypePicked → SubtaskPicked →
/// ParametersFilled → Submitted`. A failed submission keeps the form; the next
/// edit returns the session to `ParametersFilled`, and resubmitting is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoDevice,
    DeviceSelected,
    TaskTypePicked,
    SubtaskPicked,
    ParametersFilled,
    Submitted(SubmitStatus),
}

impl SessionPhase {
    /// Whether the script generation action is available.
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            SessionPhase::ParametersFilled | SessionPhase::Submitted(SubmitStatus::Failure)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionPhase::NoDevice => "no device",
            SessionPhase::DeviceSelected => "device selected",
            SessionPhase::TaskTypePicked => "task type picked",
            SessionPhase::SubtaskPicked => "subtask picked",
            SessionPhase::ParametersFilled => "parameters filled",
            SessionPhase::Submitted(SubmitStatus::Success) => "submitted",
            SessionPhase::Submitted(SubmitStatus::Failure) => "submission failed",
        };
        f.write_str(text)
    }
}
