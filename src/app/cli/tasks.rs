//! `ncm tasks` subcommands.

use clap::Subcommand;

use super::Globals;
use super::prompt;
use crate::app::api::LiveSession;
use crate::domain::{AppError, TaskRecord};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List the tasks registered for a device
    #[clap(visible_alias = "ls")]
    List {
        /// Device name (defaults to the first registered device)
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Delete one task by its list position (0-based)
    Delete {
        index: usize,
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Delete every task of a device
    Clear {
        #[arg(short, long)]
        device: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub(super) fn select_device(
    session: &mut LiveSession,
    device: Option<&str>,
) -> Result<String, AppError> {
    session.refresh_devices()?;
    if let Some(name) = device
        && !session.select_device(name)
    {
        return Err(AppError::DeviceNotFound(name.to_string()));
    }
    session.selected_device().map(|device| device.name.clone()).ok_or(AppError::NoDeviceSelected)
}

pub fn run_tasks(globals: &Globals, command: TaskCommands) -> Result<(), AppError> {
    let mut session = globals.open()?;

    match command {
        TaskCommands::List { device } => {
            select_device(&mut session, device.as_deref())?;
            let tasks = session.tasks()?;
            if let Some(encoded) = globals.format.structured(&tasks)? {
                println!("{}", encoded);
                return Ok(());
            }
            if tasks.is_empty() {
                println!("No tasks registered");
            }
            for (index, task) in tasks.iter().enumerate() {
                println!("{}", describe(index, task));
            }
            Ok(())
        }
        TaskCommands::Delete { index, device } => {
            let name = select_device(&mut session, device.as_deref())?;
            session.delete_task(index)?;
            println!("✅ Deleted task {} of {}", index, name);
            Ok(())
        }
        TaskCommands::Clear { device, yes } => {
            let name = select_device(&mut session, device.as_deref())?;
            if !yes && !prompt::confirm(&format!("Delete every task of '{}'?", name), false)? {
                println!("Cancelled");
                return Ok(());
            }
            session.clear_tasks()?;
            println!("✅ Cleared tasks of {}", name);
            Ok(())
        }
    }
}

fn describe(index: usize, task: &TaskRecord) -> String {
    let params: Vec<String> = task
        .parameters
        .iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(text) => format!("{}={}", name, text),
            other => format!("{}={}", name, other),
        })
        .collect();
    let mut line =
        format!("{:>3}. {} / {} [{}]", index, task.task_type, task.subtask, task.status);
    if !params.is_empty() {
        line.push_str(&format!(" {}", params.join(" ")));
    }
    if let Some(created) = task.created_at {
        line.push_str(&format!(" ({})", created.format("%Y-%m-%d %H:%M")));
    }
    if let Some(error) = &task.error {
        line.push_str(&format!(" error: {}", error));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_lists_parameters_and_error() {
        let record: TaskRecord = serde_json::from_value(serde_json::json!({
            "device_id": "SW1",
            "task_type": "VLAN 설정",
            "subtask": "create",
            "parameters": {"vlan_id": "10", "tagged": true},
            "status": "failed",
            "error": "timeout",
            "created_at": "2024-03-01T10:20:30"
        }))
        .unwrap();

        let line = describe(0, &record);
        assert!(line.starts_with("  0. VLAN 설정 / create [failed] tagged=true vlan_id=10"));
        assert!(line.ends_with("(2024-03-01 10:20) error: timeout"));
    }
}
