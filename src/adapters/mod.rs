pub mod clipboard_arboard;
pub mod html_view;
pub mod http_backend;
pub mod retrying_backend;
pub mod terminal_notifier;

pub use clipboard_arboard::ArboardClipboard;
pub use html_view::HtmlView;
pub use http_backend::HttpConfigBackend;
pub use retrying_backend::{RetryPolicy, RetryingBackend};
pub use terminal_notifier::TerminalNotifier;
