use crate::domain::Notice;

/// Port for non-blocking user notifications.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}
