//! Device directory: cached device list, current selection and registry edits.

use crate::app::AppContext;
use crate::domain::{AppError, Device, DeviceDraft, NO_DEVICES_MESSAGE, Notice, NoticeCode};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier};

/// Session copy of the device registry.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: Vec<Device>,
    selected: Option<String>,
    loaded: bool,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.name == name)
    }

    pub fn selected(&self) -> Option<&Device> {
        self.selected.as_deref().and_then(|name| self.find(name))
    }

    /// Replace the cached list.
    ///
    /// The first device is selected only on the initial load; later loads keep
    /// the selection while the device still exists.
    pub fn apply_listing(&mut self, devices: Vec<Device>) {
        let first_load = !self.loaded;
        self.devices = devices;
        self.loaded = true;

        if first_load {
            self.selected = self.devices.first().map(|device| device.name.clone());
        } else if self.selected.as_deref().is_some_and(|name| self.find(name).is_none()) {
            self.selected = None;
        }
    }

    /// Select a known device; unknown names leave the selection untouched.
    pub fn select(&mut self, name: &str) -> Option<&Device> {
        let known = self.find(name).is_some();
        if known {
            self.selected = Some(name.to_string());
        }
        self.selected()
    }
}

/// Fetch the registry and refresh the directory.
pub fn load<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    directory: &mut DeviceDirectory,
) -> Result<(), AppError> {
    let devices = ctx.backend().list_devices()?;
    tracing::debug!(count = devices.len(), "devices loaded");
    directory.apply_listing(devices);

    if directory.devices().is_empty() {
        ctx.notify(Notice::info(NoticeCode::NoDevices, NO_DEVICES_MESSAGE));
    }
    Ok(())
}

/// Select a device by name. Returns `false` (with a notice) for unknown names.
pub fn select<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    directory: &mut DeviceDirectory,
    name: &str,
) -> bool {
    if directory.find(name).is_none() {
        tracing::warn!(device = name, "select of unknown device ignored");
        ctx.notify(Notice::warning(
            NoticeCode::DeviceNotFound,
            format!("장비를 찾을 수 없습니다: {}", name),
        ));
        return false;
    }
    directory.select(name);
    true
}

pub fn add<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    directory: &mut DeviceDirectory,
    draft: DeviceDraft,
) -> Result<Device, AppError> {
    let device = draft.validated()?;
    let ack = ctx.backend().add_device(&device)?;
    ctx.notify(Notice::success(ack.message.unwrap_or_else(|| "장비가 추가되었습니다.".into())));
    load(ctx, directory)?;
    Ok(device)
}

/// Update the attributes of `name`; the name itself cannot change.
pub fn edit<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    directory: &mut DeviceDirectory,
    name: &str,
    mut draft: DeviceDraft,
) -> Result<Device, AppError> {
    if directory.is_loaded() && directory.find(name).is_none() {
        return Err(AppError::DeviceNotFound(name.to_string()));
    }
    draft.name = name.to_string();
    let device = draft.validated()?;
    let ack = ctx.backend().edit_device(name, &device)?;
    ctx.notify(Notice::success(ack.message.unwrap_or_else(|| "장비가 수정되었습니다.".into())));
    load(ctx, directory)?;
    Ok(device)
}

pub fn delete<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    directory: &mut DeviceDirectory,
    name: &str,
) -> Result<(), AppError> {
    if directory.is_loaded() && directory.find(name).is_none() {
        return Err(AppError::DeviceNotFound(name.to_string()));
    }
    let ack = ctx.backend().delete_device(name)?;
    ctx.notify(Notice::success(ack.message.unwrap_or_else(|| "장비가 삭제되었습니다.".into())));
    load(ctx, directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClientConfig;
    use crate::testing::{FakeBackend, MemoryNotifier, MockClipboard};

    fn context(backend: FakeBackend) -> AppContext<FakeBackend, MockClipboard, MemoryNotifier> {
        AppContext::new(
            ClientConfig::default(),
            backend,
            MockClipboard::new(),
            MemoryNotifier::new(),
        )
    }

    #[test]
    fn initial_load_selects_first_device() {
        let backend =
            FakeBackend::new()
                .with_device("SW1", "10.0.0.1", "cisco")
                .with_device("SW2", "10.0.0.2", "hp");
        let mut ctx = context(backend);
        let mut directory = DeviceDirectory::new();

        load(&mut ctx, &mut directory).unwrap();

        assert_eq!(directory.devices().len(), 2);
        assert_eq!(directory.selected().map(|d| d.name.as_str()), Some("SW1"));
    }

    #[test]
    fn empty_registry_selects_nothing_and_notifies() {
        let mut ctx = context(FakeBackend::new());
        let mut directory = DeviceDirectory::new();

        load(&mut ctx, &mut directory).unwrap();

        assert!(directory.selected().is_none());
        assert!(ctx.notifier().has(NoticeCode::NoDevices));
    }

    #[test]
    fn reload_keeps_existing_selection() {
        let mut directory = DeviceDirectory::new();
        let sw1 = Device {
            name: "SW1".into(),
            ip: "10.0.0.1".into(),
            vendor: "cisco".into(),
            model: "IOS".into(),
        };
        let sw2 = Device { name: "SW2".into(), ..sw1.clone() };

        directory.apply_listing(vec![sw1.clone(), sw2.clone()]);
        directory.select("SW2");
        directory.apply_listing(vec![sw1.clone(), sw2]);
        assert_eq!(directory.selected().map(|d| d.name.as_str()), Some("SW2"));

        directory.apply_listing(vec![sw1]);
        assert!(directory.selected().is_none());
    }

    #[test]
    fn unknown_device_select_is_a_noop_with_notice() {
        let mut ctx = context(FakeBackend::new().with_device("SW1", "10.0.0.1", "cisco"));
        let mut directory = DeviceDirectory::new();
        load(&mut ctx, &mut directory).unwrap();

        assert!(!select(&mut ctx, &mut directory, "R9"));
        assert_eq!(directory.selected().map(|d| d.name.as_str()), Some("SW1"));
        assert!(ctx.notifier().has(NoticeCode::DeviceNotFound));
    }

    #[test]
    fn add_validates_before_calling_backend() {
        let backend = FakeBackend::new();
        let mut ctx = context(backend.clone());
        let mut directory = DeviceDirectory::new();

        let draft = DeviceDraft::new("SW1", "10.0.0.256", "cisco", "IOS");
        let err = add(&mut ctx, &mut directory, draft).unwrap_err();

        assert!(matches!(err, AppError::InvalidIp(_)));
        assert_eq!(backend.network_calls(), 0);
    }

    #[test]
    fn add_normalizes_vendor_and_reloads() {
        let backend = FakeBackend::new();
        let mut ctx = context(backend.clone());
        let mut directory = DeviceDirectory::new();

        let device =
            add(&mut ctx, &mut directory, DeviceDraft::new("SW3", "10.0.0.3", "한드림넷", "HOS"))
                .unwrap();

        assert_eq!(device.vendor, "handreamnet");
        assert_eq!(backend.devices()[0].vendor, "handreamnet");
        assert_eq!(directory.devices().len(), 1);
        assert_eq!(backend.calls(), vec!["add_device SW3", "list_devices"]);
    }

    #[test]
    fn edit_keeps_the_registered_name() {
        let backend = FakeBackend::new().with_device("SW1", "10.0.0.1", "cisco");
        let mut ctx = context(backend.clone());
        let mut directory = DeviceDirectory::new();
        load(&mut ctx, &mut directory).unwrap();

        let device = edit(
            &mut ctx,
            &mut directory,
            "SW1",
            DeviceDraft::new("renamed", "10.0.0.9", "Cisco", "NX-OS"),
        )
        .unwrap();

        assert_eq!(device.name, "SW1");
        assert_eq!(directory.find("SW1").map(|d| d.ip.as_str()), Some("10.0.0.9"));
    }

    #[test]
    fn delete_unknown_device_fails_without_request() {
        let backend = FakeBackend::new().with_device("SW1", "10.0.0.1", "cisco");
        let mut ctx = context(backend.clone());
        let mut directory = DeviceDirectory::new();
        load(&mut ctx, &mut directory).unwrap();

        let err = delete(&mut ctx, &mut directory, "R9").unwrap_err();
        assert!(matches!(err, AppError::DeviceNotFound(_)));
        assert_eq!(backend.calls(), vec!["list_devices"]);

        delete(&mut ctx, &mut directory, "SW1").unwrap();
        assert!(directory.devices().is_empty());
    }
}
