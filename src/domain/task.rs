//! Task registration and script generation payloads.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::selection::{ParameterValues, TaskSelection};

/// One configuration task for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub device_id: String,
    pub task_type: String,
    pub subtask: String,
    pub parameters: ParameterValues,
}

impl TaskRequest {
    /// One request per selected subtask, in selection order.
    pub fn from_selection(device_id: &str, selection: &TaskSelection) -> Vec<TaskRequest> {
        selection
            .selected()
            .map(|(task_type, subtask, values)| TaskRequest {
                device_id: device_id.to_string(),
                task_type: task_type.to_string(),
                subtask: subtask.to_string(),
                parameters: values.clone(),
            })
            .collect()
    }
}

/// Task entry of a script generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptTask {
    pub task_type: String,
    pub subtask: String,
    pub parameters: ParameterValues,
}

/// Body of `POST /generate-script`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRequest {
    pub device_id: String,
    pub tasks: Vec<ScriptTask>,
}

impl ScriptRequest {
    pub fn from_tasks(device_id: &str, tasks: &[TaskRequest]) -> Self {
        Self {
            device_id: device_id.to_string(),
            tasks: tasks
                .iter()
                .map(|task| ScriptTask {
                    task_type: task.task_type.clone(),
                    subtask: task.subtask.clone(),
                    parameters: task.parameters.clone(),
                })
                .collect(),
        }
    }
}

/// Generated CLI configuration text, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScriptText(String);

impl ScriptText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl std::fmt::Display for ScriptText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend answer to running the registered script of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Device console output, when the backend returns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A task registered on the backend for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub device_id: String,
    pub task_type: String,
    pub subtask: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

fn default_status() -> String {
    "pending".to_string()
}
