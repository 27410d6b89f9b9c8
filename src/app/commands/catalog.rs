//! Task catalog client with fallback substitution.

use crate::app::AppContext;
use crate::domain::{
    AppError, Applied, FormDocument, LoadTicket, Notice, NoticeCode, ParameterSchema, Subtask,
    SubtaskPanel, TaskSelection, TaskType,
};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier, TaskTypeQuery};

/// A catalog answer and, when the requested type failed, the type that served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub data: T,
    pub substitute: Option<TaskType>,
}

impl<T> Fetched<T> {
    fn direct(data: T) -> Self {
        Self { data, substitute: None }
    }

    fn substituted(data: T, substitute: &str) -> Self {
        Self { data, substitute: Some(substitute.to_string()) }
    }
}

/// Message shown when a fallback task type answered in place of the requested one.
pub fn substitution_message(requested: &str, substitute: &str) -> String {
    format!("'{}' 정보를 불러오지 못해 '{}' 기준으로 표시합니다.", requested, substitute)
}

/// Fetch the enabled task types; an empty catalog is reported as a notice.
pub fn list_task_types<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    reset: bool,
) -> Result<Vec<TaskType>, AppError> {
    let query = TaskTypeQuery { names_only: ctx.config().catalog.names_only, reset };
    let task_types = ctx.backend().list_task_types(query)?;
    if task_types.is_empty() {
        ctx.notify(Notice::warning(NoticeCode::EmptyCatalog, "사용 가능한 작업 유형이 없습니다."));
    }
    Ok(task_types)
}

/// Fetch the subtasks of a task type, retrying once against a fallback type.
pub fn fetch_subtasks<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &AppContext<B, C, N>,
    task_type: &str,
) -> Result<Fetched<Vec<Subtask>>, AppError> {
    let original = match ctx.backend().list_subtasks(task_type) {
        Ok(subtasks) => return Ok(Fetched::direct(subtasks)),
        Err(err) => err,
    };
    let load_error = || AppError::SubtaskLoad {
        task_type: task_type.to_string(),
        details: original.to_string(),
    };

    let Some(fallback) = ctx.config().catalog.fallback_for(task_type) else {
        return Err(load_error());
    };
    tracing::warn!(task_type, fallback, error = %original, "subtask load failed, trying fallback");

    match ctx.backend().list_subtasks(fallback) {
        Ok(subtasks) => Ok(Fetched::substituted(subtasks, fallback)),
        Err(fallback_err) => {
            tracing::debug!(fallback, error = %fallback_err, "fallback subtask load failed");
            Err(load_error())
        }
    }
}

/// Fetch the parameter schemas of a subtask; the fallback keeps the subtask.
pub fn fetch_parameters<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &AppContext<B, C, N>,
    task_type: &str,
    subtask: &str,
) -> Result<Fetched<Vec<ParameterSchema>>, AppError> {
    let original = match ctx.backend().get_parameters(task_type, subtask) {
        Ok(schemas) => return Ok(Fetched::direct(schemas)),
        Err(err) => err,
    };
    let load_error = || AppError::ParameterLoad {
        task_type: task_type.to_string(),
        subtask: subtask.to_string(),
        details: original.to_string(),
    };

    let Some(fallback) = ctx.config().catalog.fallback_for(task_type) else {
        return Err(load_error());
    };
    tracing::warn!(
        task_type,
        subtask,
        fallback,
        error = %original,
        "parameter load failed, trying fallback"
    );

    match ctx.backend().get_parameters(fallback, subtask) {
        Ok(schemas) => Ok(Fetched::substituted(schemas, fallback)),
        Err(fallback_err) => {
            tracing::debug!(
                fallback,
                subtask,
                error = %fallback_err,
                "fallback parameter load failed"
            );
            Err(load_error())
        }
    }
}

/// Apply a subtask answer to the selection and the document.
///
/// Answers whose ticket went stale are dropped without touching either.
pub fn apply_subtasks<B: ConfigBackend, C: ClipboardWriter, N: Notifier>(
    ctx: &mut AppContext<B, C, N>,
    selection: &mut TaskSelection,
    document: &mut FormDocument,
    ticket: &LoadTicket,
    result: Result<Fetched<Vec<Subtask>>, AppError>,
) -> Result<Applied, AppError> {
    if !selection.is_current(ticket) {
        tracing::debug!(task_type = %ticket.task_type, "stale subtask response dropped");
        ctx.notify(Notice::info(
            NoticeCode::StaleResponse,
            format!("'{}' 응답이 늦게 도착해 무시되었습니다.", ticket.task_type),
        ));
        return Ok(Applied::Stale);
    }

    let fetched = match result {
        Ok(fetched) => fetched,
        Err(err) => {
            selection.abandon_load(ticket);
            return Err(err);
        }
    };

    let task_type = ticket.task_type.as_str();
    let mut panel = SubtaskPanel::new(task_type, fetched.data.clone());
    let applied = selection.apply_subtasks(ticket, fetched.data);
    if applied == Applied::Stale {
        return Ok(applied);
    }

    if let Some(substitute) = &fetched.substitute {
        let message = substitution_message(task_type, substitute);
        ctx.notify(Notice::warning(NoticeCode::FallbackSubstituted, message.clone()));
        panel.notice = Some(message);
    }
    document.upsert_subtask_panel(panel);

    let orphaned: Vec<Subtask> = document
        .parameter_panels()
        .iter()
        .filter(|existing| existing.task_type == task_type)
        .filter(|existing| !selection.is_subtask_selected(task_type, &existing.subtask))
        .map(|existing| existing.subtask.clone())
        .collect();
    for subtask in orphaned {
        document.remove_parameter_panel(task_type, &subtask);
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogConfig, ClientConfig};
    use crate::testing::{FakeBackend, MemoryNotifier, MockClipboard};

    fn context(backend: FakeBackend) -> AppContext<FakeBackend, MockClipboard, MemoryNotifier> {
        AppContext::new(
            ClientConfig::default(),
            backend,
            MockClipboard::new(),
            MemoryNotifier::new(),
        )
    }

    #[test]
    fn empty_catalog_is_a_notice_not_an_error() {
        let mut ctx = context(FakeBackend::new());

        let types = list_task_types(&mut ctx, false).unwrap();

        assert!(types.is_empty());
        assert!(ctx.notifier().has(NoticeCode::EmptyCatalog));
    }

    #[test]
    fn reset_flag_is_forwarded() {
        let backend = FakeBackend::new().with_task_types(&["vlan"]);
        let mut ctx = context(backend.clone());

        list_task_types(&mut ctx, true).unwrap();

        assert_eq!(backend.calls(), vec!["list_task_types reset"]);
    }

    #[test]
    fn subtasks_fall_back_once_to_first_other_type() {
        let backend = FakeBackend::new().with_subtasks("포트 설정", &["mode", "speed"]);
        let ctx = context(backend.clone());

        let fetched = fetch_subtasks(&ctx, "VLAN 설정").unwrap();

        assert_eq!(fetched.data, vec!["mode".to_string(), "speed".to_string()]);
        assert_eq!(fetched.substitute.as_deref(), Some("포트 설정"));
        assert_eq!(backend.calls(), vec!["list_subtasks VLAN 설정", "list_subtasks 포트 설정"]);
    }

    #[test]
    fn failing_fallback_surfaces_original_error() {
        let backend = FakeBackend::new();
        let ctx = context(backend.clone());

        let err = fetch_subtasks(&ctx, "VLAN 설정").unwrap_err();

        match err {
            AppError::SubtaskLoad { task_type, details } => {
                assert_eq!(task_type, "VLAN 설정");
                assert!(details.contains("VLAN 설정"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(backend.network_calls(), 2);
    }

    #[test]
    fn fallback_skips_the_failing_type_itself() {
        let backend = FakeBackend::new().with_subtasks("인터페이스 설정", &["status"]);
        let ctx = context(backend.clone());

        let fetched = fetch_subtasks(&ctx, "포트 설정").unwrap();

        assert_eq!(fetched.substitute.as_deref(), Some("인터페이스 설정"));
    }

    #[test]
    fn no_configured_fallback_fails_immediately() {
        let backend = FakeBackend::new();
        let config = ClientConfig {
            catalog: CatalogConfig { fallback_task_types: Vec::new(), names_only: false },
            ..ClientConfig::default()
        };
        let ctx =
            AppContext::new(config, backend.clone(), MockClipboard::new(), MemoryNotifier::new());

        assert!(fetch_subtasks(&ctx, "vlan").is_err());
        assert_eq!(backend.network_calls(), 1);
    }

    #[test]
    fn parameters_fallback_keeps_subtask() {
        let backend = FakeBackend::new().with_parameters(
            "포트 설정",
            "create",
            vec![ParameterSchema::text("port", "Port")],
        );
        let ctx = context(backend.clone());

        let fetched = fetch_parameters(&ctx, "VLAN 설정", "create").unwrap();

        assert_eq!(fetched.data.len(), 1);
        assert_eq!(
            backend.calls(),
            vec!["get_parameters VLAN 설정/create", "get_parameters 포트 설정/create"]
        );

        let err = fetch_parameters(&ctx, "VLAN 설정", "delete").unwrap_err();
        assert!(matches!(err, AppError::ParameterLoad { .. }));
    }

    #[test]
    fn substituted_subtasks_carry_a_notice() {
        let backend = FakeBackend::new().with_subtasks("포트 설정", &["mode"]);
        let mut ctx = context(backend);
        let mut selection = TaskSelection::new();
        let mut document = FormDocument::new();

        let ticket = selection.select_task_type("VLAN 설정");
        let result = fetch_subtasks(&ctx, "VLAN 설정");
        let applied =
            apply_subtasks(&mut ctx, &mut selection, &mut document, &ticket, result).unwrap();

        assert_eq!(applied, Applied::Current);
        assert_eq!(selection.subtasks("VLAN 설정"), &["mode".to_string()]);
        let panel = document.subtask_panel("VLAN 설정").unwrap();
        assert!(panel.notice.as_deref().unwrap().contains("포트 설정"));
        assert!(ctx.notifier().has(NoticeCode::FallbackSubstituted));
    }

    #[test]
    fn stale_answer_leaves_document_untouched() {
        let backend = FakeBackend::new().with_subtasks("vlan", &["create"]);
        let mut ctx = context(backend);
        let mut selection = TaskSelection::new();
        let mut document = FormDocument::new();

        let ticket = selection.select_task_type("vlan");
        let result = fetch_subtasks(&ctx, "vlan");
        selection.deselect_task_type("vlan");

        let applied =
            apply_subtasks(&mut ctx, &mut selection, &mut document, &ticket, result).unwrap();

        assert_eq!(applied, Applied::Stale);
        assert!(document.is_empty());
        assert!(ctx.notifier().has(NoticeCode::StaleResponse));
    }
}
