use std::io;

use thiserror::Error;

use crate::domain::form::FieldIssue;

/// Library-wide error type for ncm operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Transport-level failure talking to the backend.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a payload of an unexpected shape.
    #[error("Malformed {what} response: {details}")]
    MalformedResponse { what: String, details: String },

    /// Subtask list could not be loaded, fallback included.
    #[error("Failed to load subtasks for '{task_type}': {details}")]
    SubtaskLoad { task_type: String, details: String },

    /// Parameter schema could not be loaded, fallback included.
    #[error("Failed to load parameters for '{task_type}' / '{subtask}': {details}")]
    ParameterLoad { task_type: String, subtask: String, details: String },

    /// Client-side validation blocked the request.
    #[error("{}", describe_issues(.0))]
    Validation(Vec<FieldIssue>),

    /// The backend reported a non-success status.
    #[error("Server error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Server { status: Option<u16>, message: String },

    /// No device with this name is known.
    #[error("Device '{0}' not found")]
    DeviceNotFound(String),

    /// An operation needs a selected device.
    #[error("No device selected")]
    NoDeviceSelected,

    /// Subtask operations need their task type to be checked first.
    #[error("Task type '{0}' is not selected")]
    TaskTypeNotSelected(String),

    /// The subtask is not part of the loaded list for its task type.
    #[error("Subtask '{subtask}' is not available for '{task_type}'")]
    SubtaskUnavailable { task_type: String, subtask: String },

    /// IP address failed the dotted-quad check.
    #[error("Invalid IP address '{0}': expected four octets in 0-255")]
    InvalidIp(String),

    /// Configuration values failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Clipboard access failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// View template failed to load or render.
    #[error("Template error: {0}")]
    Template(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    match issues {
        [] => "Validation failed".to_string(),
        [single] => format!("Validation failed: {}", single),
        many => {
            let lines: Vec<String> = many.iter().map(|issue| format!("  - {}", issue)).collect();
            format!("Validation failed:\n{}", lines.join("\n"))
        }
    }
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn malformed(what: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::MalformedResponse { what: what.into(), details: details.into() }
    }

    /// Errors that may succeed when the same request is sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::Server { status: Some(code), .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Validation(_)
            | AppError::InvalidIp(_)
            | AppError::InvalidConfig(_)
            | AppError::Configuration(_)
            | AppError::TaskTypeNotSelected(_)
            | AppError::SubtaskUnavailable { .. }
            | AppError::NoDeviceSelected
            | AppError::TomlParse(_) => io::ErrorKind::InvalidInput,
            AppError::DeviceNotFound(_) => io::ErrorKind::NotFound,
            AppError::MalformedResponse { .. } => io::ErrorKind::InvalidData,
            AppError::Network(_) => io::ErrorKind::ConnectionRefused,
            AppError::SubtaskLoad { .. }
            | AppError::ParameterLoad { .. }
            | AppError::Server { .. }
            | AppError::Clipboard(_)
            | AppError::Template(_) => io::ErrorKind::Other,
        }
    }
}
