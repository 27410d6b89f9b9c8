//! API Facade for the application.
//!
//! This module glues configuration loading, adapter construction and the
//! configuration session together.

use std::path::Path;

use crate::adapters::{
    ArboardClipboard, HttpConfigBackend, RetryPolicy, RetryingBackend, TerminalNotifier,
};
use crate::app::AppContext;
use crate::app::config::load_config;
use crate::app::session::ConfigSession;
use crate::ports::{ClipboardWriter, NoopClipboard};

pub use crate::app::commands::catalog::Fetched;
pub use crate::app::commands::devices::DeviceDirectory;
pub use crate::app::commands::dispatcher::Submission;
pub use crate::domain::{AppError, ClientConfig, DeviceDraft, SessionPhase};

/// Session wired to the HTTP backend, the system clipboard and the terminal.
pub type LiveSession = ConfigSession<RetryingBackend, Box<dyn ClipboardWriter>, TerminalNotifier>;

/// One script generation run driven without interaction.
#[derive(Debug, Clone, Default)]
pub struct ScriptJob {
    /// Device to generate for; the auto-selected device when `None`.
    pub device: Option<String>,
    pub task_type: String,
    pub subtasks: Vec<String>,
    /// `name=value` pairs, applied to every subtask whose form has the field.
    pub params: Vec<(String, String)>,
    pub copy: bool,
}

/// Build the HTTP backend with retries for idempotent reads.
pub fn build_backend(config: &ClientConfig) -> Result<RetryingBackend, AppError> {
    let http = HttpConfigBackend::new(&config.api)?;
    Ok(RetryingBackend::new(Box::new(http), RetryPolicy::from_config(&config.api)))
}

/// The system clipboard, or a clipboard that refuses every write when none is reachable.
pub fn system_clipboard() -> Box<dyn ClipboardWriter> {
    match ArboardClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(err) => {
            tracing::debug!(error = %err, "system clipboard unavailable");
            Box::new(NoopClipboard)
        }
    }
}

/// Create a session from an already loaded configuration. Nothing is fetched yet.
pub fn session_from_config(
    config: ClientConfig,
    notifier: TerminalNotifier,
) -> Result<LiveSession, AppError> {
    config.validate()?;
    let backend = build_backend(&config)?;
    let ctx = AppContext::new(config, backend, system_clipboard(), notifier);
    Ok(ConfigSession::new(ctx))
}

/// Load the configuration and create the session without fetching anything.
pub fn open_session(
    config_path: Option<&Path>,
    notifier: TerminalNotifier,
) -> Result<LiveSession, AppError> {
    session_from_config(load_config(config_path)?, notifier)
}

/// Open a session and run its initial loads.
pub fn connect(
    config_path: Option<&Path>,
    notifier: TerminalNotifier,
) -> Result<LiveSession, AppError> {
    let mut session = open_session(config_path, notifier)?;
    session.init()?;
    Ok(session)
}

/// Select, fill and submit in one go.
pub fn run_script_job(session: &mut LiveSession, job: &ScriptJob) -> Result<Submission, AppError> {
    if let Some(device) = job.device.as_deref()
        && !session.select_device(device)
    {
        return Err(AppError::DeviceNotFound(device.to_string()));
    }
    if job.subtasks.is_empty() {
        return Err(AppError::Validation(vec![crate::domain::FieldIssue::nothing_selected()]));
    }

    session.check_task_type(&job.task_type)?;
    for subtask in &job.subtasks {
        session.check_subtask(&job.task_type, subtask)?;
    }

    for (name, value) in &job.params {
        let targets: Vec<&String> = job
            .subtasks
            .iter()
            .filter(|subtask| {
                session
                    .document()
                    .parameter_panel(&job.task_type, subtask)
                    .is_some_and(|panel| panel.field(name).is_some())
            })
            .collect();
        if targets.is_empty() {
            return Err(AppError::config_error(format!(
                "Unknown parameter '{}' for '{}'",
                name, job.task_type
            )));
        }
        for subtask in targets {
            session.set_value(&job.task_type, subtask, name, value)?;
        }
    }

    let submission = session.submit()?;
    if job.copy {
        session.copy_script()?;
    }
    Ok(submission)
}

/// Parse a `name=value` command-line pair.
pub fn parse_param(raw: &str) -> Result<(String, String), AppError> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        AppError::config_error(format!("Parameter '{}' must look like name=value", raw))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::config_error(format!("Parameter '{}' has no name", raw)));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_the_first_equals_sign() {
        assert_eq!(
            parse_param("description=a=b").unwrap(),
            ("description".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_param("vlan_name=").unwrap(), ("vlan_name".to_string(), String::new()));
    }

    #[test]
    fn params_without_name_are_rejected() {
        assert!(parse_param("vlan_id").is_err());
        assert!(parse_param(" =10").is_err());
    }

    #[test]
    fn invalid_configuration_is_rejected_before_connecting() {
        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;

        let err = session_from_config(config, TerminalNotifier::quiet()).err().unwrap();

        assert!(matches!(err, AppError::InvalidConfig(_)));
    }
}
