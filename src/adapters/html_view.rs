//! HTML fragments of the form document, rendered from embedded templates.
//!
//! Templates carry the `.html` suffix, so every interpolation is HTML-escaped
//! by minijinja's default auto-escape rule.

use include_dir::{Dir, include_dir};
use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;

use crate::domain::{
    AppError, Device, FieldKind, FormDocument, FormField, NO_DEVICES_MESSAGE, ParameterPanel,
    ScriptText, SelectOption, SubtaskPanel, TaskSelection, subtask_label, task_type_label,
    vendor_label,
};

static VIEWS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/views");

#[derive(Debug, Serialize)]
struct DeviceView<'a> {
    name: &'a str,
    ip: &'a str,
    vendor: String,
    model: &'a str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct SubtaskView<'a> {
    name: &'a str,
    label: &'a str,
    checked: bool,
}

#[derive(Debug, Serialize)]
struct SubtaskPanelView<'a> {
    id: &'a str,
    task_type: &'a str,
    label: &'a str,
    notice: Option<&'a str>,
    subtasks: Vec<SubtaskView<'a>>,
}

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'a str,
    label: &'a str,
    select: bool,
    input_type: &'static str,
    required: bool,
    placeholder: Option<&'a str>,
    description: Option<&'a str>,
    pattern: Option<&'a str>,
    value: &'a str,
    options: Vec<SelectOption>,
    invalid: bool,
    feedback: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ParameterPanelView<'a> {
    id: &'a str,
    task_type: &'a str,
    subtask: &'a str,
    legend: String,
    notice: Option<&'a str>,
    fields: Vec<FieldView<'a>>,
}

fn field_view(field: &FormField) -> FieldView<'_> {
    let input_type = match field.kind {
        FieldKind::Number => "number",
        _ => "text",
    };
    FieldView {
        name: &field.name,
        label: &field.label,
        select: field.is_select(),
        input_type,
        required: field.required,
        placeholder: field.placeholder.as_deref(),
        description: field.description.as_deref(),
        pattern: field.pattern.as_ref().map(|pattern| pattern.source()),
        value: &field.value,
        options: if field.is_select() { field.rendered_options() } else { Vec::new() },
        invalid: field.is_invalid(),
        feedback: field.issue.map(|reason| reason.feedback()),
    }
}

fn subtask_panel_view<'a>(
    panel: &'a SubtaskPanel,
    selection: &TaskSelection,
) -> SubtaskPanelView<'a> {
    SubtaskPanelView {
        id: &panel.id,
        task_type: &panel.task_type,
        label: task_type_label(&panel.task_type),
        notice: panel.notice.as_deref(),
        subtasks: panel
            .subtasks
            .iter()
            .map(|subtask| SubtaskView {
                name: subtask,
                label: subtask_label(&panel.task_type, subtask),
                checked: selection.is_subtask_selected(&panel.task_type, subtask),
            })
            .collect(),
    }
}

fn parameter_panel_view(panel: &ParameterPanel) -> ParameterPanelView<'_> {
    ParameterPanelView {
        id: &panel.id,
        task_type: &panel.task_type,
        subtask: &panel.subtask,
        legend: format!(
            "{} / {}",
            task_type_label(&panel.task_type),
            subtask_label(&panel.task_type, &panel.subtask)
        ),
        notice: panel.notice.as_deref(),
        fields: panel.fields.iter().map(field_view).collect(),
    }
}

fn template_error(err: minijinja::Error) -> AppError {
    AppError::Template(err.to_string())
}

/// Renders devices, panels and scripts as escaped HTML fragments.
pub struct HtmlView {
    env: Environment<'static>,
}

impl HtmlView {
    /// Load every embedded view template.
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for file in VIEWS_DIR.files() {
            let name = file.path().to_str().ok_or_else(|| {
                AppError::Template(format!("Invalid view file name: {}", file.path().display()))
            })?;
            let source = file
                .contents_utf8()
                .ok_or_else(|| AppError::Template(format!("View '{}' is not UTF-8", name)))?;
            env.add_template(name, source).map_err(template_error)?;
        }

        if env.templates().next().is_none() {
            return Err(AppError::Template("No view templates embedded".to_string()));
        }

        Ok(Self { env })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(ctx).map_err(template_error)
    }

    /// One entry per device, or the empty placeholder.
    pub fn device_list(
        &self,
        devices: &[Device],
        selected: Option<&str>,
    ) -> Result<String, AppError> {
        let devices: Vec<DeviceView<'_>> = devices
            .iter()
            .map(|device| DeviceView {
                name: &device.name,
                ip: &device.ip,
                vendor: vendor_label(&device.vendor),
                model: &device.model,
                selected: selected == Some(device.name.as_str()),
            })
            .collect();
        self.render("device_list.html", context! { devices, empty_message => NO_DEVICES_MESSAGE })
    }

    pub fn subtask_panel(
        &self,
        panel: &SubtaskPanel,
        selection: &TaskSelection,
    ) -> Result<String, AppError> {
        let panel = subtask_panel_view(panel, selection);
        self.render("subtask_panel.html", context! { panel => panel })
    }

    pub fn parameter_panel(&self, panel: &ParameterPanel) -> Result<String, AppError> {
        self.render("parameter_panel.html", context! { panel => parameter_panel_view(panel) })
    }

    /// Every panel of the document, subtask lists first.
    pub fn document(
        &self,
        document: &FormDocument,
        selection: &TaskSelection,
    ) -> Result<String, AppError> {
        let subtask_panels: Vec<SubtaskPanelView<'_>> = document
            .subtask_panels()
            .iter()
            .map(|panel| subtask_panel_view(panel, selection))
            .collect();
        let parameter_panels: Vec<ParameterPanelView<'_>> =
            document.parameter_panels().iter().map(parameter_panel_view).collect();
        self.render("form_document.html", context! { subtask_panels, parameter_panels })
    }

    pub fn script(&self, device: &str, script: &ScriptText) -> Result<String, AppError> {
        self.render(
            "script.html",
            context! { device, script => script.as_str(), line_count => script.line_count() },
        )
    }
}
