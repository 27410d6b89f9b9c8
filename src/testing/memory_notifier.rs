use crate::domain::{Notice, NoticeCode};
use crate::ports::Notifier;

/// Notifier that keeps every notice for inspection.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub notices: Vec<Notice>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> Vec<NoticeCode> {
        self.notices.iter().map(|notice| notice.code).collect()
    }

    pub fn has(&self, code: NoticeCode) -> bool {
        self.notices.iter().any(|notice| notice.code == code)
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
