//! Device model and client-side device validation.

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// Placeholder shown when the device registry is empty.
pub const NO_DEVICES_MESSAGE: &str = "등록된 장비가 없습니다.";

/// A manageable network device as known to the backend registry.
///
/// `name` is the unique key and doubles as the device id in task requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(alias = "device_name")]
    pub name: String,
    #[serde(alias = "ip_address", default)]
    pub ip: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub model: String,
}

impl Device {
    pub fn id(&self) -> &str {
        &self.name
    }
}

/// Fields entered on the add/edit device form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceDraft {
    pub name: String,
    pub ip: String,
    pub vendor: String,
    pub model: String,
}

impl DeviceDraft {
    pub fn new(
        name: impl Into<String>,
        ip: impl Into<String>,
        vendor: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), ip: ip.into(), vendor: vendor.into(), model: model.into() }
    }

    /// Trim every field, normalize the vendor and check the draft is submittable.
    pub fn validated(self) -> Result<Device, AppError> {
        let device = Device {
            name: self.name.trim().to_string(),
            ip: self.ip.trim().to_string(),
            vendor: normalize_vendor(self.vendor.trim()),
            model: self.model.trim().to_string(),
        };

        let missing: Vec<&str> = [
            ("name", &device.name),
            ("ip", &device.ip),
            ("vendor", &device.vendor),
            ("model", &device.model),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::Configuration(format!(
                "All device fields are required (missing: {})",
                missing.join(", ")
            )));
        }

        if !is_valid_ipv4(&device.ip) {
            return Err(AppError::InvalidIp(device.ip));
        }

        Ok(device)
    }
}

/// Dotted-quad check with per-octet range validation.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts.iter().all(|part| {
        !part.is_empty()
            && part.len() <= 3
            && part.bytes().all(|b| b.is_ascii_digit())
            && part.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
    })
}

/// Canonical lower-case vendor key.
pub fn normalize_vendor(vendor: &str) -> String {
    match vendor {
        "한드림넷" => "handreamnet".to_string(),
        other => other.to_lowercase(),
    }
}

const VENDOR_MODELS: &[(&str, &[&str])] = &[
    ("cisco", &["IOS", "IOS-XE", "NX-OS"]),
    ("juniper", &["JunOS"]),
    ("hp", &["ProCurve", "Aruba"]),
    ("arista", &["EOS"]),
    ("handreamnet", &["HOS"]),
    ("coreedgenetworks", &["CEN-OS"]),
];

/// Vendors offered by the device form.
pub fn known_vendors() -> impl Iterator<Item = &'static str> {
    VENDOR_MODELS.iter().map(|(vendor, _)| *vendor)
}

/// Models offered for a vendor; empty when the vendor is not in the table.
pub fn models_for_vendor(vendor: &str) -> &'static [&'static str] {
    let key = normalize_vendor(vendor);
    VENDOR_MODELS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, models)| *models)
        .unwrap_or(&[])
}

/// Human-facing vendor label.
pub fn vendor_label(vendor: &str) -> String {
    match normalize_vendor(vendor).as_str() {
        "cisco" => "Cisco".to_string(),
        "juniper" => "Juniper".to_string(),
        "hp" => "HP".to_string(),
        "arista" => "Arista".to_string(),
        "handreamnet" => "Handreamnet".to_string(),
        "coreedgenetworks" => "CoreEdge Networks".to_string(),
        _ => vendor.to_string(),
    }
}
