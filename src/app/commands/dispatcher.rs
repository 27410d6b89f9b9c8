//! Script request dispatcher: validation, task registration and script generation.

use crate::app::AppContext;
use crate::domain::{
    AppError, Device, ExecutionReport, FieldIssue, FormDocument, Notice, NoticeCode,
    ScriptRequest, ScriptText, TaskRecord, TaskRequest, TaskSelection,
};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier};

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub device_id: String,
    pub script: ScriptText,
    /// Tasks the script was generated from, all held by the backend.
    pub registered: usize,
    /// Refreshed task list of the device; `None` when the refresh failed.
    pub tasks: Option<Vec<TaskRecord>>,
}

/// Check the session before anything is sent.
///
/// Invalid fields are highlighted in the document so their feedback shows even
/// when the operator never touched them.
///
/// Returns the id of the target device together with one request per selected
/// subtask.
pub fn validate(
    device: Option<&Device>,
    selection: &TaskSelection,
    document: &mut FormDocument,
) -> Result<(String, Vec<TaskRequest>), AppError> {
    let device = device.ok_or(AppError::NoDeviceSelected)?;
    if !selection.has_any_selection() {
        return Err(AppError::Validation(vec![FieldIssue::nothing_selected()]));
    }

    let mut issues = Vec::new();
    for (task_type, subtask, _) in selection.selected() {
        let panel = document.parameter_panel_mut(task_type, subtask).ok_or_else(|| {
            AppError::ParameterLoad {
                task_type: task_type.to_string(),
                subtask: subtask.to_string(),
                details: "parameter form is not loaded".to_string(),
            }
        })?;
        panel.highlight_issues();
        issues.extend(panel.issues());
    }
    if !issues.is_empty() {
        return Err(AppError::Validation(issues));
    }

    let device_id = device.id().to_string();
    let tasks = TaskRequest::from_selection(&device_id, selection);
    Ok((device_id, tasks))
}

/// Post every task the backend does not hold yet; stops at the first rejected task.
///
/// Each accepted task is marked in the selection, so a resubmission after a
/// partial failure posts only what is still missing. Returns how many tasks
/// were posted by this call.
pub fn register_tasks<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &AppContext<B, C, N>,
    selection: &mut TaskSelection,
    tasks: &[TaskRequest],
) -> Result<usize, AppError> {
    let mut posted = 0;
    for task in tasks {
        if selection.is_registered(&task.task_type, &task.subtask) {
            tracing::debug!(
                task_type = %task.task_type,
                subtask = %task.subtask,
                "task already registered"
            );
            continue;
        }
        ctx.backend().add_task(task)?;
        selection.mark_registered(&task.task_type, &task.subtask);
        posted += 1;
        tracing::debug!(
            device = %task.device_id,
            task_type = %task.task_type,
            subtask = %task.subtask,
            "task registered"
        );
    }
    Ok(posted)
}

pub fn generate<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &AppContext<B, C, N>,
    device_id: &str,
    tasks: &[TaskRequest],
) -> Result<ScriptText, AppError> {
    let request = ScriptRequest::from_tasks(device_id, tasks);
    let script = ctx.backend().generate_script(&request)?;
    tracing::debug!(device = device_id, lines = script.line_count(), "script generated");
    Ok(script)
}

/// Put the script on the clipboard. A failure is reported as a notice only.
pub fn copy_to_clipboard<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    script: &ScriptText,
) -> bool {
    match ctx.clipboard_mut().write_text(script.as_str()) {
        Ok(()) => {
            ctx.notify(Notice::success("스크립트가 클립보드에 복사되었습니다."));
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "clipboard unavailable");
            ctx.notify(Notice::warning(
                NoticeCode::ClipboardUnavailable,
                format!("클립보드에 복사하지 못했습니다: {}", err),
            ));
            false
        }
    }
}

/// Validate, register and generate; the form is reset only when all of it succeeded.
pub fn submit<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    device: Option<&Device>,
    selection: &mut TaskSelection,
    document: &mut FormDocument,
) -> Result<Submission, AppError> {
    let (device_id, tasks) = validate(device, selection, document)?;

    let posted = register_tasks(ctx, selection, &tasks)?;
    tracing::debug!(device = %device_id, posted, total = tasks.len(), "tasks registered");
    let script = generate(ctx, &device_id, &tasks)?;
    let registered = tasks.len();

    selection.clear();
    *document = FormDocument::new();
    ctx.notify(Notice::success(format!("{}개의 작업이 추가되었습니다.", registered)));

    let tasks = match list_tasks(ctx, &device_id) {
        Ok(tasks) => Some(tasks),
        Err(err) => {
            tracing::warn!(device = %device_id, error = %err, "task list refresh failed");
            ctx.notify(Notice::warning(
                NoticeCode::RequestFailed,
                format!("작업 목록을 새로고침하지 못했습니다: {}", err),
            ));
            None
        }
    };

    Ok(Submission { device_id, script, registered, tasks })
}

pub fn list_tasks<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &AppContext<B, C, N>,
    device_id: &str,
) -> Result<Vec<TaskRecord>, AppError> {
    ctx.backend().list_tasks(device_id)
}

pub fn delete_task<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    device_id: &str,
    index: usize,
) -> Result<(), AppError> {
    let ack = ctx.backend().delete_task(device_id, index)?;
    ctx.notify(Notice::success(ack.message.unwrap_or_else(|| "작업이 삭제되었습니다.".into())));
    Ok(())
}

pub fn clear_tasks<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    device_id: &str,
) -> Result<(), AppError> {
    let ack = ctx.backend().clear_tasks(device_id)?;
    ctx.notify(Notice::success(
        ack.message.unwrap_or_else(|| "모든 작업이 삭제되었습니다.".into()),
    ));
    Ok(())
}

/// Ask the backend to run the device's generated script.
pub fn execute<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    device_id: &str,
) -> Result<ExecutionReport, AppError> {
    let report = ctx.backend().execute_script(device_id)?;
    tracing::info!(device = device_id, "script executed");
    let message = match &report.message {
        Some(message) => message.clone(),
        None => format!("{} 스크립트가 실행되었습니다.", device_id),
    };
    ctx.notify(Notice::success(message));
    Ok(report)
}
