//! Form document: keyed panels rendered from the task catalog.
//!
//! The document stands in for the page of a browser client. Panels are keyed
//! by deterministic container ids so that re-rendering a panel replaces the
//! previous one instead of appending a duplicate.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::domain::catalog::{FieldKind, ParameterSchema, SelectOption, Subtask, TaskType};

/// Label of the empty option prepended to every select control.
pub const SELECT_PLACEHOLDER: &str = "선택하세요";

fn strip_non_alphanumeric(value: &str) -> String {
    value.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Container id of the subtask list rendered for a task type.
pub fn subtask_container_id(task_type: &str) -> String {
    format!("subtasks_{}", strip_non_alphanumeric(task_type))
}

/// Container id of the parameter panel rendered for a (task type, subtask) pair.
pub fn parameter_container_id(task_type: &str, subtask: &str) -> String {
    format!("params_{}_{}", strip_non_alphanumeric(task_type), strip_non_alphanumeric(subtask))
}

/// Why a field value is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    Required,
    PatternMismatch,
    NotANumber,
    UnknownOption,
    NothingSelected,
}

impl IssueReason {
    /// Inline feedback text shown next to the field.
    pub fn feedback(&self) -> &'static str {
        match self {
            IssueReason::Required => "필수 입력 항목입니다.",
            IssueReason::PatternMismatch => "입력 형식이 올바르지 않습니다.",
            IssueReason::NotANumber => "숫자를 입력해주세요.",
            IssueReason::UnknownOption => "목록에서 값을 선택해주세요.",
            IssueReason::NothingSelected => "최소 하나의 하위 작업을 선택해주세요.",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueReason::Required => "value is required",
            IssueReason::PatternMismatch => "value does not match the expected pattern",
            IssueReason::NotANumber => "value must be a number",
            IssueReason::UnknownOption => "value is not one of the offered options",
            IssueReason::NothingSelected => "select at least one subtask",
        };
        f.write_str(text)
    }
}

/// A validation problem attached to one field of one parameter panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub task_type: TaskType,
    pub subtask: Subtask,
    pub field: String,
    pub reason: IssueReason,
}

impl FieldIssue {
    pub fn new(
        task_type: impl Into<String>,
        subtask: impl Into<String>,
        field: impl Into<String>,
        reason: IssueReason,
    ) -> Self {
        Self { task_type: task_type.into(), subtask: subtask.into(), field: field.into(), reason }
    }

    /// Session-level issue raised when nothing is selected for submission.
    pub fn nothing_selected() -> Self {
        Self::new("", "", "", IssueReason::NothingSelected)
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{} / {} / {}: {}", self.task_type, self.subtask, self.field, self.reason)
        }
    }
}

/// Compiled `pattern` constraint; matches the whole value like an HTML pattern attribute.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    pub fn compile(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source: source.to_string(), regex })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A pattern that failed to compile and was dropped from its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPattern {
    pub field: String,
    pub pattern: String,
    pub reason: String,
}

/// One rendered input or select control.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub options: Vec<SelectOption>,
    pub pattern: Option<FieldPattern>,
    pub value: String,
    /// Inline feedback state, refreshed on every value change.
    pub issue: Option<IssueReason>,
}

impl FormField {
    fn from_schema(schema: &ParameterSchema) -> (Self, Option<RejectedPattern>) {
        let mut rejected = None;
        let pattern = match schema.pattern.as_deref().filter(|p| !p.is_empty()) {
            Some(source) => match FieldPattern::compile(source) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    rejected = Some(RejectedPattern {
                        field: schema.name.clone(),
                        pattern: source.to_string(),
                        reason: err.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let field = FormField {
            name: schema.name.clone(),
            label: schema.display_label().to_string(),
            kind: schema.kind.clone(),
            required: schema.required,
            placeholder: schema.placeholder.clone(),
            description: schema.description.clone(),
            options: schema.options.clone(),
            pattern,
            value: String::new(),
            issue: None,
        };
        (field, rejected)
    }

    pub fn is_select(&self) -> bool {
        self.kind == FieldKind::Select
    }

    /// Options as rendered, with the empty placeholder option first.
    pub fn rendered_options(&self) -> Vec<SelectOption> {
        let mut options = Vec::with_capacity(self.options.len() + 1);
        options.push(SelectOption::new("", SELECT_PLACEHOLDER));
        options.extend(self.options.iter().cloned());
        options
    }

    /// Check the stored value, exactly as it would be sent, against every constraint.
    pub fn check(&self) -> Option<IssueReason> {
        let value = self.value.as_str();
        if value.trim().is_empty() {
            return self.required.then_some(IssueReason::Required);
        }
        if self.kind == FieldKind::Number && !value.parse::<f64>().is_ok_and(f64::is_finite) {
            return Some(IssueReason::NotANumber);
        }
        if self.is_select()
            && !self.options.is_empty()
            && !self.options.iter().any(|option| option.value == value)
        {
            return Some(IssueReason::UnknownOption);
        }
        if let Some(pattern) = &self.pattern
            && !pattern.is_match(value)
        {
            return Some(IssueReason::PatternMismatch);
        }
        None
    }

    /// Store a new value and refresh the inline feedback immediately.
    pub fn set_value(&mut self, value: impl Into<String>) -> Option<IssueReason> {
        self.value = value.into();
        self.issue = self.check();
        self.issue
    }

    pub fn is_invalid(&self) -> bool {
        self.issue.is_some()
    }

    fn reset(&mut self) {
        self.value.clear();
        self.issue = None;
    }
}

/// Checkable subtask list of one task type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskPanel {
    pub id: String,
    pub task_type: TaskType,
    pub subtasks: Vec<Subtask>,
    /// Non-blocking note, e.g. a fallback substitution.
    pub notice: Option<String>,
}

impl SubtaskPanel {
    pub fn new(task_type: &str, subtasks: Vec<Subtask>) -> Self {
        Self {
            id: subtask_container_id(task_type),
            task_type: task_type.to_string(),
            subtasks,
            notice: None,
        }
    }
}

/// Parameter inputs of one (task type, subtask) pair.
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    pub id: String,
    pub task_type: TaskType,
    pub subtask: Subtask,
    pub fields: Vec<FormField>,
    pub notice: Option<String>,
}

impl ParameterPanel {
    /// Build a panel from schemas; invalid patterns are dropped and reported.
    pub fn build(
        task_type: &str,
        subtask: &str,
        schemas: &[ParameterSchema],
    ) -> (Self, Vec<RejectedPattern>) {
        let mut rejected = Vec::new();
        let fields = schemas
            .iter()
            .map(|schema| {
                let (field, dropped) = FormField::from_schema(schema);
                rejected.extend(dropped);
                field
            })
            .collect();

        let panel = ParameterPanel {
            id: parameter_container_id(task_type, subtask),
            task_type: task_type.to_string(),
            subtask: subtask.to_string(),
            fields,
            notice: None,
        };
        (panel, rejected)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// Every constraint violation of the panel, in field order.
    pub fn issues(&self) -> Vec<FieldIssue> {
        self.fields
            .iter()
            .filter_map(|field| {
                field.check().map(|reason| {
                    FieldIssue::new(&self.task_type, &self.subtask, &field.name, reason)
                })
            })
            .collect()
    }

    /// Mark every invalid field so the feedback shows without a value change.
    pub fn highlight_issues(&mut self) {
        for field in &mut self.fields {
            field.issue = field.check();
        }
    }
}

/// Ordered, keyed collection of rendered panels.
#[derive(Debug, Clone, Default)]
pub struct FormDocument {
    subtask_panels: Vec<SubtaskPanel>,
    parameter_panels: Vec<ParameterPanel>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace (by id) the subtask panel of a task type.
    pub fn upsert_subtask_panel(&mut self, panel: SubtaskPanel) {
        match self.subtask_panels.iter_mut().find(|existing| existing.id == panel.id) {
            Some(existing) => *existing = panel,
            None => self.subtask_panels.push(panel),
        }
    }

    /// Insert or replace (by id) a parameter panel.
    pub fn upsert_parameter_panel(&mut self, panel: ParameterPanel) {
        match self.parameter_panels.iter_mut().find(|existing| existing.id == panel.id) {
            Some(existing) => *existing = panel,
            None => self.parameter_panels.push(panel),
        }
    }

    /// Remove the whole subtree of a task type; returns the number of panels removed.
    pub fn remove_task_type(&mut self, task_type: &str) -> usize {
        let before = self.subtask_panels.len() + self.parameter_panels.len();
        self.subtask_panels.retain(|panel| panel.task_type != task_type);
        self.parameter_panels.retain(|panel| panel.task_type != task_type);
        before - (self.subtask_panels.len() + self.parameter_panels.len())
    }

    pub fn remove_parameter_panel(&mut self, task_type: &str, subtask: &str) -> bool {
        let id = parameter_container_id(task_type, subtask);
        let before = self.parameter_panels.len();
        self.parameter_panels.retain(|panel| panel.id != id);
        before != self.parameter_panels.len()
    }

    pub fn subtask_panel(&self, task_type: &str) -> Option<&SubtaskPanel> {
        let id = subtask_container_id(task_type);
        self.subtask_panels.iter().find(|panel| panel.id == id)
    }

    pub fn parameter_panel(&self, task_type: &str, subtask: &str) -> Option<&ParameterPanel> {
        let id = parameter_container_id(task_type, subtask);
        self.parameter_panels.iter().find(|panel| panel.id == id)
    }

    pub fn parameter_panel_mut(
        &mut self,
        task_type: &str,
        subtask: &str,
    ) -> Option<&mut ParameterPanel> {
        let id = parameter_container_id(task_type, subtask);
        self.parameter_panels.iter_mut().find(|panel| panel.id == id)
    }

    pub fn subtask_panels(&self) -> &[SubtaskPanel] {
        &self.subtask_panels
    }

    pub fn parameter_panels(&self) -> &[ParameterPanel] {
        &self.parameter_panels
    }

    /// Ids of every panel currently in the document, subtask lists first.
    pub fn container_ids(&self) -> Vec<&str> {
        self.subtask_panels
            .iter()
            .map(|panel| panel.id.as_str())
            .chain(self.parameter_panels.iter().map(|panel| panel.id.as_str()))
            .collect()
    }

    /// Clear every entered value and feedback flag; panels stay in place.
    pub fn reset_values(&mut self) {
        for panel in &mut self.parameter_panels {
            panel.fields.iter_mut().for_each(FormField::reset);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subtask_panels.is_empty() && self.parameter_panels.is_empty()
    }
}
