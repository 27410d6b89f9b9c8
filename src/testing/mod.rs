mod fake_backend;
mod memory_notifier;
mod mock_clipboard;

pub use fake_backend::FakeBackend;
pub use memory_notifier::MemoryNotifier;
pub use mock_clipboard::MockClipboard;
