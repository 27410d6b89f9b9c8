use crate::domain::{ClientConfig, Notice};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier};

/// Application context holding dependencies for command execution.
pub struct AppContext<B: ConfigBackend, C: ClipboardWriter, N: Notifier> {
    config: ClientConfig,
    backend: B,
    clipboard: C,
    notifier: N,
}

impl<B: ConfigBackend, C: ClipboardWriter, N: Notifier> AppContext<B, C, N> {
    /// Create a new application context.
    pub fn new(config: ClientConfig, backend: B, clipboard: C, notifier: N) -> Self {
        Self { config, backend, clipboard, notifier }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a reference to the configuration backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Hand a notice to the notifier.
    pub fn notify(&mut self, notice: Notice) {
        self.notifier.notify(&notice);
    }
}
