//! Notices printed to stderr.

use crate::domain::{Notice, NoticeLevel};
use crate::ports::Notifier;

/// Prints every notice on its own line, below `min_level` notices are skipped.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    min_level: NoticeLevel,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self { min_level: NoticeLevel::Info }
    }

    /// Only print warnings and errors.
    pub fn quiet() -> Self {
        Self { min_level: NoticeLevel::Warning }
    }

    fn rank(level: NoticeLevel) -> u8 {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => 0,
            NoticeLevel::Warning => 1,
            NoticeLevel::Error => 2,
        }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: &Notice) {
        tracing::debug!(code = ?notice.code, level = ?notice.level, "notice");
        if Self::rank(notice.level) >= Self::rank(self.min_level) {
            eprintln!("{}", notice);
        }
    }
}
