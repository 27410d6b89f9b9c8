//! Configuration backend client implementation using reqwest.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::domain::{
    ApiConfig, AppError, Device, ExecutionReport, ParameterSchema, ScriptRequest, ScriptText,
    Subtask, TaskRecord, TaskRequest, TaskType,
};
use crate::ports::{Ack, ConfigBackend, TaskTypeQuery};

const DEFAULT_STATUS_MESSAGE: &str = "Backend request failed";
const SUCCESS_STATUS: &str = "success";

/// HTTP transport for the configuration backend.
///
/// This client performs a single request per call. Retry behavior is implemented
/// by a dedicated retry wrapper adapter.
#[derive(Clone)]
pub struct HttpConfigBackend {
    base_url: Url,
    prefix: String,
    client: Client,
}

impl std::fmt::Debug for HttpConfigBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfigBackend")
            .field("base_url", &self.base_url.as_str())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl HttpConfigBackend {
    /// Create a new HTTP client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            prefix: config.route_prefix().to_string(),
            client,
        })
    }

    /// Absolute URL of an API route; every segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::InvalidConfig(format!("base_url '{}' cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            for part in self.prefix.split('/').filter(|part| !part.is_empty()) {
                path.push(part);
            }
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "backend request");
        self.client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Value, AppError> {
        let response = request
            .send()
            .map_err(|e| AppError::Network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body_text = response
            .text()
            .map_err(|e| AppError::Network(format!("Failed to read {} response: {}", what, e)))?;

        if !status.is_success() {
            let message = extract_error_message(&body_text).unwrap_or_else(|| {
                if !body_text.trim().is_empty() {
                    body_text.trim().to_string()
                } else if status.as_u16() == 429 {
                    "Rate limited".to_string()
                } else if status.is_server_error() {
                    "Server error".to_string()
                } else {
                    DEFAULT_STATUS_MESSAGE.to_string()
                }
            });
            tracing::debug!(status = status.as_u16(), what, "backend rejected request");
            return Err(AppError::Server { status: Some(status.as_u16()), message });
        }

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&body_text)
            .map_err(|e| AppError::malformed(what, format!("invalid JSON: {}", e)))?;
        ensure_success_status(&value)?;
        Ok(value)
    }

    fn get(&self, segments: &[&str], what: &str) -> Result<Value, AppError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url), what)
    }

    fn ack(&self, request: RequestBuilder, what: &str) -> Result<Ack, AppError> {
        let value = self.send(request, what)?;
        Ok(Ack { message: value.get("message").and_then(Value::as_str).map(ToOwned::to_owned) })
    }
}

/// A `{status: "...", message}` envelope with any status but `success` is a refusal.
fn ensure_success_status(value: &Value) -> Result<(), AppError> {
    let Some(status) = value.get("status").and_then(Value::as_str) else {
        return Ok(());
    };
    if status == SUCCESS_STATUS {
        return Ok(());
    }
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| format!("status '{}'", status));
    Err(AppError::Server { status: None, message })
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<Value>(body).ok()?;

    if let Some(msg) =
        parsed.get("error").and_then(|error| error.get("message")).and_then(Value::as_str)
    {
        return Some(msg.to_string());
    }
    if let Some(msg) = parsed.get("error").and_then(Value::as_str) {
        return Some(msg.to_string());
    }

    parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}

/// Accept a bare array or an object carrying the array under one of `keys`.
fn unwrap_list(value: Value, keys: &[&str], what: &str) -> Result<Vec<Value>, AppError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                AppError::malformed(what, format!("expected an array or one of {:?}", keys))
            }),
        other => {
            Err(AppError::malformed(what, format!("expected an array, got {}", kind_of(&other))))
        }
    }
}

fn decode_list<T: DeserializeOwned>(
    value: Value,
    keys: &[&str],
    what: &str,
) -> Result<Vec<T>, AppError> {
    let items = unwrap_list(value, keys, what)?;
    serde_json::from_value(Value::Array(items))
        .map_err(|e| AppError::malformed(what, e.to_string()))
}

/// Names given either as bare strings or as `{name}` objects.
fn decode_names(value: Value, keys: &[&str], what: &str) -> Result<Vec<String>, AppError> {
    unwrap_list(value, keys, what)?
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            Value::Object(map) => match map.get("name") {
                Some(Value::String(name)) => Ok(name.clone()),
                _ => Err(AppError::malformed(what, "object entry without a 'name' string")),
            },
            other => {
                Err(AppError::malformed(what, format!("unexpected {} entry", kind_of(&other))))
            }
        })
        .collect()
}

fn decode_script(value: Value) -> Result<ScriptText, AppError> {
    let script = value
        .get("script")
        .or_else(|| value.get("data").and_then(|data| data.get("script")))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::malformed("generate-script", "response has no 'script' text"))?;
    Ok(ScriptText::new(script))
}

/// `message` and `output` may sit at the top level or under `data`; output lines
/// given as an array are joined.
fn decode_execution(device_id: &str, value: Value) -> Result<ExecutionReport, AppError> {
    let pick = |key: &str| {
        value.get(key).or_else(|| value.get("data").and_then(|data| data.get(key))).cloned()
    };
    let message = match pick("message") {
        None | Some(Value::Null) => None,
        Some(Value::String(message)) => Some(message),
        Some(other) => {
            return Err(AppError::malformed(
                "execute",
                format!("'message' is a {}", kind_of(&other)),
            ));
        }
    };
    let output = match pick("output") {
        None | Some(Value::Null) => None,
        Some(Value::String(output)) => Some(output),
        Some(Value::Array(lines)) => Some(
            lines
                .iter()
                .map(|line| {
                    line.as_str().map(ToOwned::to_owned).ok_or_else(|| {
                        AppError::malformed("execute", "output lines must be strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
                .join("\n"),
        ),
        Some(other) => {
            return Err(AppError::malformed(
                "execute",
                format!("'output' is a {}", kind_of(&other)),
            ));
        }
    };
    Ok(ExecutionReport { device_id: device_id.to_string(), message, output })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ConfigBackend for HttpConfigBackend {
    fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        let value = self.get(&["devices"], "devices")?;
        decode_list(value, &["devices", "data"], "devices")
    }

    fn add_device(&self, device: &Device) -> Result<Ack, AppError> {
        let url = self.endpoint(&["devices"])?;
        self.ack(self.request(Method::POST, url).json(device), "add device")
    }

    fn edit_device(&self, name: &str, device: &Device) -> Result<Ack, AppError> {
        let url = self.endpoint(&["devices", name])?;
        self.ack(self.request(Method::PUT, url).json(device), "edit device")
    }

    fn delete_device(&self, name: &str) -> Result<Ack, AppError> {
        let url = self.endpoint(&["devices", name])?;
        self.ack(self.request(Method::DELETE, url), "delete device")
    }

    fn list_task_types(&self, query: TaskTypeQuery) -> Result<Vec<TaskType>, AppError> {
        let mut url = self.endpoint(&["task-types"])?;
        if query.names_only {
            url.query_pairs_mut().append_pair("format", "names_only");
        }
        if query.reset {
            url.query_pairs_mut().append_pair("reset", "true");
        }
        let value = self.send(self.request(Method::GET, url), "task types")?;
        decode_names(value, &["task_types", "data"], "task types")
    }

    fn list_subtasks(&self, task_type: &str) -> Result<Vec<Subtask>, AppError> {
        let value = self.get(&["subtasks", task_type], "subtasks")?;
        decode_names(value, &["subtasks", "data"], "subtasks")
    }

    fn get_parameters(
        &self,
        task_type: &str,
        subtask: &str,
    ) -> Result<Vec<ParameterSchema>, AppError> {
        let value = self.get(&["parameters", task_type, subtask], "parameters")?;
        decode_list(value, &["parameters", "data"], "parameters")
    }

    fn list_tasks(&self, device_id: &str) -> Result<Vec<TaskRecord>, AppError> {
        let mut url = self.endpoint(&["tasks"])?;
        url.query_pairs_mut().append_pair("device_id", device_id);
        let value = self.send(self.request(Method::GET, url), "tasks")?;
        decode_list(value, &["tasks", "data"], "tasks")
    }

    fn add_task(&self, task: &TaskRequest) -> Result<Ack, AppError> {
        let url = self.endpoint(&["tasks"])?;
        self.ack(self.request(Method::POST, url).json(task), "add task")
    }

    fn delete_task(&self, device_id: &str, index: usize) -> Result<Ack, AppError> {
        let index = index.to_string();
        let url = self.endpoint(&["tasks", device_id, &index])?;
        self.ack(self.request(Method::DELETE, url), "delete task")
    }

    fn clear_tasks(&self, device_id: &str) -> Result<Ack, AppError> {
        let url = self.endpoint(&["tasks", device_id])?;
        self.ack(self.request(Method::DELETE, url), "clear tasks")
    }

    fn generate_script(&self, request: &ScriptRequest) -> Result<ScriptText, AppError> {
        let url = self.endpoint(&["generate-script"])?;
        let value = self.send(self.request(Method::POST, url).json(request), "generate-script")?;
        decode_script(value)
    }

    fn execute_script(&self, device_id: &str) -> Result<ExecutionReport, AppError> {
        let url = self.endpoint(&["devices", device_id, "execute"])?;
        let value = self.send(self.request(Method::POST, url), "execute")?;
        decode_execution(device_id, value)
    }
}
