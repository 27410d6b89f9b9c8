//! `ncm devices` subcommands.

use clap::Subcommand;

use super::Globals;
use super::output::OutputFormat;
use super::prompt;
use crate::adapters::HtmlView;
use crate::domain::{
    AppError, Device, DeviceDraft, NO_DEVICES_MESSAGE, known_vendors, models_for_vendor,
    vendor_label,
};

#[derive(Subcommand)]
pub enum DeviceCommands {
    /// List registered devices
    #[clap(visible_alias = "ls")]
    List,
    /// Register a device; missing fields are prompted for
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Change the attributes of a device; the name stays the same
    Edit {
        name: String,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Remove a device
    #[clap(visible_alias = "rm")]
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Select a device and show its registered tasks
    Select { name: String },
}

pub fn run_devices(globals: &Globals, command: DeviceCommands) -> Result<(), AppError> {
    let mut session = globals.open()?;
    session.refresh_devices()?;

    match command {
        DeviceCommands::List => {
            let selected = session.selected_device().map(|device| device.name.clone());
            print_devices(globals.format, session.devices(), selected.as_deref())
        }
        DeviceCommands::Add { name, ip, vendor, model } => {
            let Some(draft) = resolve_draft(name, ip, vendor, model)? else {
                return Ok(());
            };
            let device = session.add_device(draft)?;
            println!("✅ Added {} ({})", device.name, device.ip);
            Ok(())
        }
        DeviceCommands::Edit { name, ip, vendor, model } => {
            let current = session
                .devices()
                .iter()
                .find(|device| device.name == name)
                .cloned()
                .ok_or_else(|| AppError::DeviceNotFound(name.clone()))?;
            let draft = DeviceDraft::new(
                &name,
                ip.as_deref().unwrap_or(&current.ip),
                vendor.as_deref().unwrap_or(&current.vendor),
                model.as_deref().unwrap_or(&current.model),
            );
            let device = session.edit_device(&name, draft)?;
            println!(
                "✅ Updated {} ({}, {} {})",
                device.name, device.ip, device.vendor, device.model
            );
            Ok(())
        }
        DeviceCommands::Delete { name, yes } => {
            if !yes && !prompt::confirm(&format!("Delete device '{}'?", name), false)? {
                println!("Cancelled");
                return Ok(());
            }
            session.delete_device(&name)?;
            println!("✅ Deleted {}", name);
            Ok(())
        }
        DeviceCommands::Select { name } => {
            if !session.select_device(&name) {
                return Err(AppError::DeviceNotFound(name));
            }
            let tasks = session.tasks()?;
            println!("✅ Selected {} ({} registered task(s))", name, tasks.len());
            Ok(())
        }
    }
}

fn print_devices(
    format: OutputFormat,
    devices: &[Device],
    selected: Option<&str>,
) -> Result<(), AppError> {
    if let Some(encoded) = format.structured(devices)? {
        println!("{}", encoded);
        return Ok(());
    }
    if format == OutputFormat::Html {
        println!("{}", HtmlView::new()?.device_list(devices, selected)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("{}", NO_DEVICES_MESSAGE);
        return Ok(());
    }
    for device in devices {
        let marker = if selected == Some(device.name.as_str()) { "*" } else { " " };
        println!(
            "{} {:<16} {:<15} {:<12} {}",
            marker,
            device.name,
            device.ip,
            vendor_label(&device.vendor),
            device.model
        );
    }
    Ok(())
}

fn resolve_draft(
    name: Option<String>,
    ip: Option<String>,
    vendor: Option<String>,
    model: Option<String>,
) -> Result<Option<DeviceDraft>, AppError> {
    let name = match name {
        Some(value) => value,
        None => match prompt::text("Device name")? {
            Some(value) => value,
            None => return Ok(None),
        },
    };
    let ip = match ip {
        Some(value) => value,
        None => match prompt::text("IP address")? {
            Some(value) => value,
            None => return Ok(None),
        },
    };
    let vendor = match vendor {
        Some(value) => value,
        None => {
            let vendors: Vec<String> = known_vendors().map(str::to_string).collect();
            let labels: Vec<String> = vendors.iter().map(|v| vendor_label(v)).collect();
            match prompt::select("Vendor", &labels)? {
                Some(index) => vendors[index].clone(),
                None => return Ok(None),
            }
        }
    };
    let model = match model {
        Some(value) => value,
        None => {
            let models: Vec<String> =
                models_for_vendor(&vendor).iter().map(|m| m.to_string()).collect();
            let chosen = if models.is_empty() {
                prompt::text("Model")?
            } else {
                prompt::select("Model", &models)?.map(|index| models[index].clone())
            };
            match chosen {
                Some(value) => value,
                None => return Ok(None),
            }
        }
    };

    Ok(Some(DeviceDraft::new(&name, &ip, &vendor, &model)))
}
