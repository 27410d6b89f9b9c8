//! Non-blocking user notifications.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What a notice is about; lets callers react to a notice without parsing its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCode {
    EmptyCatalog,
    FallbackSubstituted,
    DeviceNotFound,
    NoDevices,
    InvalidPattern,
    ClipboardUnavailable,
    StaleResponse,
    RequestFailed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: NoticeCode,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(code: NoticeCode, message: impl Into<String>) -> Self {
        Self { code, level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { code: NoticeCode::Completed, level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(code: NoticeCode, message: impl Into<String>) -> Self {
        Self { code, level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(code: NoticeCode, message: impl Into<String>) -> Self {
        Self { code, level: NoticeLevel::Error, message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Success => "✅",
            NoticeLevel::Warning => "⚠️ ",
            NoticeLevel::Error => "❌",
        };
        write!(f, "{} {}", marker, self.message)
    }
}
