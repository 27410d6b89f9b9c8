//! Parameter panels: rendering schemas and tracking field edits.

use crate::app::AppContext;
use crate::app::commands::catalog::{Fetched, substitution_message};
use crate::domain::{
    AppError, Applied, FormDocument, IssueReason, LoadTicket, Notice, NoticeCode, ParameterPanel,
    ParameterSchema, TaskSelection,
};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier};

/// Build the panel of a (task type, subtask) pair and put it in the document.
///
/// Rendering the same pair again replaces its panel. Values already entered
/// for the pair are written back into the new fields.
pub fn render<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    document: &mut FormDocument,
    selection: &TaskSelection,
    task_type: &str,
    subtask: &str,
    schemas: &[ParameterSchema],
) -> ParameterPanel {
    let (mut panel, rejected) = ParameterPanel::build(task_type, subtask, schemas);

    for dropped in rejected {
        tracing::warn!(
            field = %dropped.field,
            pattern = %dropped.pattern,
            reason = %dropped.reason,
            "invalid parameter pattern dropped"
        );
        ctx.notify(Notice::warning(
            NoticeCode::InvalidPattern,
            format!("'{}' 필드의 입력 패턴이 올바르지 않아 무시합니다.", dropped.field),
        ));
    }

    if let Some(values) = selection.parameters(task_type, subtask) {
        for (name, value) in values {
            if let Some(field) = panel.field_mut(name) {
                field.set_value(value.as_str());
            }
        }
    }

    document.upsert_parameter_panel(panel.clone());
    panel
}

/// Apply a parameter-schema answer for a selected subtask.
///
/// A failed load unchecks the subtask so it cannot be submitted without its form.
pub fn apply_parameters<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    selection: &mut TaskSelection,
    document: &mut FormDocument,
    ticket: &LoadTicket,
    result: Result<Fetched<Vec<ParameterSchema>>, AppError>,
) -> Result<Applied, AppError> {
    let Some(subtask) = ticket.subtask.as_deref() else {
        return Ok(Applied::Stale);
    };
    let task_type = ticket.task_type.as_str();

    if !selection.is_current(ticket) {
        tracing::debug!(task_type, subtask, "stale parameter response dropped");
        ctx.notify(Notice::info(
            NoticeCode::StaleResponse,
            format!("'{} / {}' 응답이 늦게 도착해 무시되었습니다.", task_type, subtask),
        ));
        return Ok(Applied::Stale);
    }

    let fetched = match result {
        Ok(fetched) => fetched,
        Err(err) => {
            selection.deselect_subtask(task_type, subtask);
            document.remove_parameter_panel(task_type, subtask);
            return Err(err);
        }
    };

    render(ctx, document, selection, task_type, subtask, &fetched.data);

    if let Some(substitute) = &fetched.substitute {
        let message = substitution_message(task_type, substitute);
        ctx.notify(Notice::warning(NoticeCode::FallbackSubstituted, message.clone()));
        if let Some(panel) = document.parameter_panel_mut(task_type, subtask) {
            panel.notice = Some(message);
        }
    }
    Ok(Applied::Current)
}

/// Store a field value and return the inline feedback it now shows.
///
/// Surrounding whitespace is dropped once here, so the value that is checked is
/// the value that is registered.
pub fn update_field(
    document: &mut FormDocument,
    selection: &mut TaskSelection,
    task_type: &str,
    subtask: &str,
    name: &str,
    value: &str,
) -> Result<Option<IssueReason>, AppError> {
    let panel = document.parameter_panel_mut(task_type, subtask).ok_or_else(|| {
        AppError::SubtaskUnavailable {
            task_type: task_type.to_string(),
            subtask: subtask.to_string(),
        }
    })?;
    let field = panel.field_mut(name).ok_or_else(|| {
        AppError::config_error(format!(
            "Unknown parameter '{}' for '{}' / '{}'",
            name, task_type, subtask
        ))
    })?;

    let value = value.trim();
    selection.set_parameter(task_type, subtask, name, value)?;
    Ok(field.set_value(value))
}
