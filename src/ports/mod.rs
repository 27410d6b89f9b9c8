mod clipboard_writer;
mod config_backend;
mod notifier;

pub use clipboard_writer::{ClipboardWriter, NoopClipboard};
pub use config_backend::{Ack, ConfigBackend, TaskTypeQuery};
pub use notifier::Notifier;
