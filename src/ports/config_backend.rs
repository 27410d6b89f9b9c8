//! Configuration management backend port definition.

use crate::domain::{
    AppError, Device, ExecutionReport, ParameterSchema, ScriptRequest, ScriptText, Subtask,
    TaskRecord, TaskRequest, TaskType,
};

/// Query flags of the task type listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTypeQuery {
    /// Ask for bare names instead of `{name}` objects.
    pub names_only: bool,
    /// Ask the backend to rebuild its catalog before answering.
    pub reset: bool,
}

/// Acknowledgement of a mutating request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

/// Port for the configuration management backend.
///
/// Every call is a single blocking request. Implementations report transport
/// failures as `AppError::Network` and non-success answers as `AppError::Server`.
pub trait ConfigBackend {
    fn list_devices(&self) -> Result<Vec<Device>, AppError>;

    fn add_device(&self, device: &Device) -> Result<Ack, AppError>;

    /// Replace the attributes of the device registered as `name`.
    fn edit_device(&self, name: &str, device: &Device) -> Result<Ack, AppError>;

    fn delete_device(&self, name: &str) -> Result<Ack, AppError>;

    fn list_task_types(&self, query: TaskTypeQuery) -> Result<Vec<TaskType>, AppError>;

    fn list_subtasks(&self, task_type: &str) -> Result<Vec<Subtask>, AppError>;

    fn get_parameters(
        &self,
        task_type: &str,
        subtask: &str,
    ) -> Result<Vec<ParameterSchema>, AppError>;

    fn list_tasks(&self, device_id: &str) -> Result<Vec<TaskRecord>, AppError>;

    fn add_task(&self, task: &TaskRequest) -> Result<Ack, AppError>;

    /// Remove the task at `index` of the device's task list.
    fn delete_task(&self, device_id: &str, index: usize) -> Result<Ack, AppError>;

    fn clear_tasks(&self, device_id: &str) -> Result<Ack, AppError>;

    fn generate_script(&self, request: &ScriptRequest) -> Result<ScriptText, AppError>;

    /// Run the script generated for the device on the device itself.
    fn execute_script(&self, device_id: &str) -> Result<ExecutionReport, AppError>;
}
