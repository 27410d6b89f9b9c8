//! Retry wrapper for idempotent backend reads.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::{
    ApiConfig, AppError, Device, ExecutionReport, ParameterSchema, ScriptRequest, ScriptText,
    Subtask, TaskRecord, TaskRequest, TaskType,
};
use crate::ports::{Ack, ConfigBackend, TaskTypeQuery};

const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
const MAX_LOG_ERROR_CHARS: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay_ms: config.retry_delay_ms.max(1),
            max_delay_ms: DEFAULT_MAX_DELAY_MS.max(config.retry_delay_ms),
        }
    }

    fn delay_for_retry(&self, failed_attempt: u32) -> Duration {
        // attempt=1 -> base, attempt=2 -> base*2, attempt=3 -> base*4, capped.
        let exponent = failed_attempt.saturating_sub(1).min(6);
        let multiplier = 1_u64 << exponent;
        let backoff_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        let jitter_ms = compute_jitter_ms(backoff_ms);
        Duration::from_millis(backoff_ms.saturating_add(jitter_ms).min(self.max_delay_ms))
    }
}

/// Retries transient failures of reads; mutations are sent exactly once.
pub struct RetryingBackend {
    inner: Box<dyn ConfigBackend>,
    policy: RetryPolicy,
}

impl RetryingBackend {
    pub fn new(inner: Box<dyn ConfigBackend>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn with_retry<T>(
        &self,
        operation: &str,
        call: impl Fn(&dyn ConfigBackend) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut attempt = 1;
        loop {
            match call(self.inner.as_ref()) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_transient() || attempt >= self.policy.max_attempts {
                        return Err(error);
                    }

                    let delay = self.policy.delay_for_retry(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {} ms.",
                        operation,
                        attempt,
                        self.policy.max_attempts,
                        format_error_for_log(&error),
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl ConfigBackend for RetryingBackend {
    fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        self.with_retry("list_devices", |inner| inner.list_devices())
    }

    fn add_device(&self, device: &Device) -> Result<Ack, AppError> {
        self.inner.add_device(device)
    }

    fn edit_device(&self, name: &str, device: &Device) -> Result<Ack, AppError> {
        self.inner.edit_device(name, device)
    }

    fn delete_device(&self, name: &str) -> Result<Ack, AppError> {
        self.inner.delete_device(name)
    }

    fn list_task_types(&self, query: TaskTypeQuery) -> Result<Vec<TaskType>, AppError> {
        self.with_retry("list_task_types", |inner| inner.list_task_types(query))
    }

    fn list_subtasks(&self, task_type: &str) -> Result<Vec<Subtask>, AppError> {
        self.with_retry("list_subtasks", |inner| inner.list_subtasks(task_type))
    }

    fn get_parameters(
        &self,
        task_type: &str,
        subtask: &str,
    ) -> Result<Vec<ParameterSchema>, AppError> {
        self.with_retry("get_parameters", |inner| inner.get_parameters(task_type, subtask))
    }

    fn list_tasks(&self, device_id: &str) -> Result<Vec<TaskRecord>, AppError> {
        self.with_retry("list_tasks", |inner| inner.list_tasks(device_id))
    }

    fn add_task(&self, task: &TaskRequest) -> Result<Ack, AppError> {
        self.inner.add_task(task)
    }

    fn delete_task(&self, device_id: &str, index: usize) -> Result<Ack, AppError> {
        self.inner.delete_task(device_id, index)
    }

    fn clear_tasks(&self, device_id: &str) -> Result<Ack, AppError> {
        self.inner.clear_tasks(device_id)
    }

    fn generate_script(&self, request: &ScriptRequest) -> Result<ScriptText, AppError> {
        self.inner.generate_script(request)
    }

    fn execute_script(&self, device_id: &str) -> Result<ExecutionReport, AppError> {
        self.inner.execute_script(device_id)
    }
}

fn compute_jitter_ms(backoff_ms: u64) -> u64 {
    if backoff_ms <= 1 {
        return 0;
    }

    let jitter_cap = backoff_ms / 4; // 25% jitter upper bound
    if jitter_cap == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.subsec_nanos() as u64)
        .unwrap_or(0);

    nanos % jitter_cap
}

fn format_error_for_log(error: &AppError) -> String {
    let sanitized = sanitize_and_truncate_for_log(&error.to_string());
    match error {
        AppError::Server { status: Some(code), .. } => format!("status={}: {}", code, sanitized),
        _ => sanitized,
    }
}

fn sanitize_and_truncate_for_log(input: &str) -> String {
    let mut output = String::new();

    for (count, ch) in input.chars().enumerate() {
        if count >= MAX_LOG_ERROR_CHARS {
            break;
        }
        output.push(if ch.is_control() { ' ' } else { ch });
    }

    let mut compact = output.split_whitespace().collect::<Vec<_>>().join(" ");
    if input.chars().count() > MAX_LOG_ERROR_CHARS {
        compact.push_str(" [truncated]");
    }
    compact.trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Answers `list_subtasks` from a queue; every other call is unexpected.
    struct SequenceBackend {
        attempts: Arc<AtomicUsize>,
        responses: Mutex<Vec<Result<Vec<Subtask>, AppError>>>,
    }

    impl SequenceBackend {
        fn new(responses: Vec<Result<Vec<Subtask>, AppError>>) -> Self {
            Self { attempts: Arc::new(AtomicUsize::new(0)), responses: Mutex::new(responses) }
        }
    }

    fn unexpected<T>() -> Result<T, AppError> {
        Err(AppError::Server { status: Some(400), message: "test: unexpected call".to_string() })
    }

    impl ConfigBackend for SequenceBackend {
        fn list_devices(&self) -> Result<Vec<Device>, AppError> {
            unexpected()
        }
        fn add_device(&self, _device: &Device) -> Result<Ack, AppError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Server { status: Some(503), message: "unavailable".to_string() })
        }
        fn edit_device(&self, _name: &str, _device: &Device) -> Result<Ack, AppError> {
            unexpected()
        }
        fn delete_device(&self, _name: &str) -> Result<Ack, AppError> {
            unexpected()
        }
        fn list_task_types(&self, _query: TaskTypeQuery) -> Result<Vec<TaskType>, AppError> {
            unexpected()
        }
        fn list_subtasks(&self, _task_type: &str) -> Result<Vec<Subtask>, AppError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let mut guard = self.responses.lock().expect("responses lock poisoned");
            if guard.is_empty() {
                return Err(AppError::Server {
                    status: Some(500),
                    message: "test: unexpected extra call".to_string(),
                });
            }
            guard.remove(0)
        }
        fn get_parameters(&self, _t: &str, _s: &str) -> Result<Vec<ParameterSchema>, AppError> {
            unexpected()
        }
        fn list_tasks(&self, _device_id: &str) -> Result<Vec<TaskRecord>, AppError> {
            unexpected()
        }
        fn add_task(&self, _task: &TaskRequest) -> Result<Ack, AppError> {
            unexpected()
        }
        fn delete_task(&self, _device_id: &str, _index: usize) -> Result<Ack, AppError> {
            unexpected()
        }
        fn clear_tasks(&self, _device_id: &str) -> Result<Ack, AppError> {
            unexpected()
        }
        fn generate_script(&self, _request: &ScriptRequest) -> Result<ScriptText, AppError> {
            unexpected()
        }
        fn execute_script(&self, _device_id: &str) -> Result<ExecutionReport, AppError> {
            unexpected()
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy { max_attempts, base_delay_ms: 1, max_delay_ms: 2 }
    }

    #[test]
    fn retries_transient_failures_and_succeeds() {
        let inner = SequenceBackend::new(vec![
            Err(AppError::Server { status: Some(500), message: "server error".to_string() }),
            Err(AppError::Network("connection reset".to_string())),
            Ok(vec!["create".to_string()]),
        ]);
        let backend = RetryingBackend::new(Box::new(inner), policy(3));

        let result = backend.list_subtasks("vlan").unwrap();
        assert_eq!(result, vec!["create".to_string()]);
    }

    #[test]
    fn does_not_retry_on_client_error() {
        let inner = SequenceBackend::new(vec![Err(AppError::Server {
            status: Some(404),
            message: "unknown task type".to_string(),
        })]);
        let backend = RetryingBackend::new(Box::new(inner), policy(3));

        match backend.list_subtasks("vlan").unwrap_err() {
            AppError::Server { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn stops_after_max_attempts() {
        let inner = SequenceBackend::new(vec![
            Err(AppError::Server { status: Some(502), message: "bad gateway".to_string() }),
            Err(AppError::Server { status: Some(502), message: "bad gateway".to_string() }),
        ]);
        let backend = RetryingBackend::new(Box::new(inner), policy(2));

        let err = backend.list_subtasks("vlan").unwrap_err();
        assert!(matches!(err, AppError::Server { status: Some(502), .. }));
    }

    #[test]
    fn mutations_are_not_retried() {
        let inner = SequenceBackend::new(Vec::new());
        let attempts = Arc::clone(&inner.attempts);
        let backend = RetryingBackend::new(Box::new(inner), policy(3));
        let device = Device {
            name: "SW1".into(),
            ip: "10.0.0.1".into(),
            vendor: "cisco".into(),
            model: "IOS".into(),
        };

        assert!(backend.add_device(&device).is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn log_format_sanitizes_control_characters() {
        let err = AppError::Server {
            status: Some(500),
            message: "bad\nerror\twith\rcontrols".to_string(),
        };
        let formatted = format_error_for_log(&err);
        assert!(formatted.starts_with("status=500:"));
        assert!(!formatted.contains('\n'));
        assert!(!formatted.contains('\r'));
    }
}
