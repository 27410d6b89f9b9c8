use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use crate::domain::{
    AppError, Device, ExecutionReport, ParameterSchema, ScriptRequest, ScriptText, Subtask,
    TaskRecord, TaskRequest, TaskType,
};
use crate::ports::{Ack, ConfigBackend, TaskTypeQuery};

#[derive(Default)]
struct FakeState {
    devices: Vec<Device>,
    task_types: Vec<TaskType>,
    subtasks: BTreeMap<TaskType, Vec<Subtask>>,
    parameters: BTreeMap<(TaskType, Subtask), Vec<ParameterSchema>>,
    tasks: Vec<TaskRecord>,
    script: String,
    failing: BTreeSet<&'static str>,
    failing_calls: BTreeSet<String>,
    calls: Vec<String>,
    added_tasks: Vec<TaskRequest>,
    script_requests: Vec<ScriptRequest>,
}

/// In-memory backend recording every call.
///
/// Subtask and parameter lookups without a registered answer fail with a 404
/// server error; operations named in `failing` and calls named in `failing_call`
/// fail with a network error until `recover` is called.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, name: &str, ip: &str, vendor: &str) -> Self {
        self.state.lock().unwrap().devices.push(Device {
            name: name.to_string(),
            ip: ip.to_string(),
            vendor: vendor.to_string(),
            model: String::new(),
        });
        self
    }

    pub fn with_task_types(self, task_types: &[&str]) -> Self {
        self.state.lock().unwrap().task_types = task_types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_subtasks(self, task_type: &str, subtasks: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .subtasks
            .insert(task_type.to_string(), subtasks.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_parameters(
        self,
        task_type: &str,
        subtask: &str,
        schemas: Vec<ParameterSchema>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .parameters
            .insert((task_type.to_string(), subtask.to_string()), schemas);
        self
    }

    pub fn with_script(self, script: &str) -> Self {
        self.state.lock().unwrap().script = script.to_string();
        self
    }

    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    /// Fail one exact call, e.g. `"add_task vlan/delete"`.
    pub fn failing_call(self, call: &str) -> Self {
        self.state.lock().unwrap().failing_calls.insert(call.to_string());
        self
    }

    /// Let every call succeed again.
    pub fn recover(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing.clear();
        state.failing_calls.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn network_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn added_tasks(&self) -> Vec<TaskRequest> {
        self.state.lock().unwrap().added_tasks.clone()
    }

    pub fn script_requests(&self) -> Vec<ScriptRequest> {
        self.state.lock().unwrap().script_requests.clone()
    }

    pub fn devices(&self) -> Vec<Device> {
        self.state.lock().unwrap().devices.clone()
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let call = if detail.is_empty() {
            operation.to_string()
        } else {
            format!("{} {}", operation, detail)
        };
        let fails = state.failing.contains(operation) || state.failing_calls.contains(&call);
        state.calls.push(call);
        if fails {
            return Err(AppError::Network(format!("{} unreachable", operation)));
        }
        Ok(())
    }
}

fn not_found(what: String) -> AppError {
    AppError::Server { status: Some(404), message: format!("{} not found", what) }
}

impl ConfigBackend for FakeBackend {
    fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        self.record("list_devices", String::new())?;
        Ok(self.devices())
    }

    fn add_device(&self, device: &Device) -> Result<Ack, AppError> {
        self.record("add_device", device.name.clone())?;
        let mut state = self.state.lock().unwrap();
        if state.devices.iter().any(|existing| existing.name == device.name) {
            return Err(AppError::Server {
                status: None,
                message: "이미 존재하는 장비입니다.".to_string(),
            });
        }
        state.devices.push(device.clone());
        Ok(Ack { message: Some("장비가 추가되었습니다.".to_string()) })
    }

    fn edit_device(&self, name: &str, device: &Device) -> Result<Ack, AppError> {
        self.record("edit_device", name.to_string())?;
        let mut state = self.state.lock().unwrap();
        let existing = state
            .devices
            .iter_mut()
            .find(|existing| existing.name == name)
            .ok_or_else(|| not_found(format!("device {}", name)))?;
        *existing = device.clone();
        Ok(Ack::default())
    }

    fn delete_device(&self, name: &str) -> Result<Ack, AppError> {
        self.record("delete_device", name.to_string())?;
        let mut state = self.state.lock().unwrap();
        let before = state.devices.len();
        state.devices.retain(|device| device.name != name);
        if before == state.devices.len() {
            return Err(not_found(format!("device {}", name)));
        }
        Ok(Ack::default())
    }

    fn list_task_types(&self, query: TaskTypeQuery) -> Result<Vec<TaskType>, AppError> {
        let detail = if query.reset { "reset".to_string() } else { String::new() };
        self.record("list_task_types", detail)?;
        Ok(self.state.lock().unwrap().task_types.clone())
    }

    fn list_subtasks(&self, task_type: &str) -> Result<Vec<Subtask>, AppError> {
        self.record("list_subtasks", task_type.to_string())?;
        self.state
            .lock()
            .unwrap()
            .subtasks
            .get(task_type)
            .cloned()
            .ok_or_else(|| not_found(format!("subtasks of {}", task_type)))
    }

    fn get_parameters(
        &self,
        task_type: &str,
        subtask: &str,
    ) -> Result<Vec<ParameterSchema>, AppError> {
        self.record("get_parameters", format!("{}/{}", task_type, subtask))?;
        self.state
            .lock()
            .unwrap()
            .parameters
            .get(&(task_type.to_string(), subtask.to_string()))
            .cloned()
            .ok_or_else(|| not_found(format!("parameters of {}/{}", task_type, subtask)))
    }

    fn list_tasks(&self, device_id: &str) -> Result<Vec<TaskRecord>, AppError> {
        self.record("list_tasks", device_id.to_string())?;
        let state = self.state.lock().unwrap();
        Ok(state.tasks.iter().filter(|task| task.device_id == device_id).cloned().collect())
    }

    fn add_task(&self, task: &TaskRequest) -> Result<Ack, AppError> {
        self.record("add_task", format!("{}/{}", task.task_type, task.subtask))?;
        let mut state = self.state.lock().unwrap();
        state.added_tasks.push(task.clone());
        state.tasks.push(TaskRecord {
            device_id: task.device_id.clone(),
            task_type: task.task_type.clone(),
            subtask: task.subtask.clone(),
            parameters: task
                .parameters
                .iter()
                .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                .collect(),
            status: "pending".to_string(),
            result: None,
            error: None,
            created_at: None,
            updated_at: None,
        });
        Ok(Ack::default())
    }

    fn delete_task(&self, device_id: &str, index: usize) -> Result<Ack, AppError> {
        self.record("delete_task", format!("{}/{}", device_id, index))?;
        let mut state = self.state.lock().unwrap();
        let positions: Vec<usize> = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.device_id == device_id)
            .map(|(position, _)| position)
            .collect();
        let position =
            *positions.get(index).ok_or_else(|| not_found(format!("task {}", index)))?;
        state.tasks.remove(position);
        Ok(Ack::default())
    }

    fn clear_tasks(&self, device_id: &str) -> Result<Ack, AppError> {
        self.record("clear_tasks", device_id.to_string())?;
        self.state.lock().unwrap().tasks.retain(|task| task.device_id != device_id);
        Ok(Ack::default())
    }

    fn generate_script(&self, request: &ScriptRequest) -> Result<ScriptText, AppError> {
        self.record("generate_script", request.device_id.clone())?;
        let mut state = self.state.lock().unwrap();
        state.script_requests.push(request.clone());
        Ok(ScriptText::new(state.script.clone()))
    }

    fn execute_script(&self, device_id: &str) -> Result<ExecutionReport, AppError> {
        self.record("execute_script", device_id.to_string())?;
        let state = self.state.lock().unwrap();
        Ok(ExecutionReport {
            device_id: device_id.to_string(),
            message: Some(format!("{} 스크립트가 실행되었습니다.", device_id)),
            output: (!state.script.is_empty()).then(|| state.script.clone()),
        })
    }
}
