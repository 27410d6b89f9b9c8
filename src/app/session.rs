//! Configuration session: the single owner of directory, selection and form document.

use crate::adapters::HtmlView;
use crate::app::AppContext;
use crate::app::commands::catalog::{self, Fetched};
use crate::app::commands::devices::{self, DeviceDirectory};
use crate::app::commands::dispatcher::{self, Submission};
use crate::app::commands::form_builder;
use crate::domain::{
    AppError, Applied, Device, DeviceDraft, ExecutionReport, FormDocument, IssueReason,
    LoadTicket, ParameterSchema, ScriptText, SessionPhase, SubmitStatus, Subtask, TaskRecord,
    TaskSelection, TaskType,
};
use crate::ports::{ClipboardWriter, ConfigBackend, Notifier};

/// One operator session against the backend.
///
/// Loads are split into `begin_*` (issue a ticket) and `finish_*` (apply the
/// answer) so that an answer arriving after its selection changed is dropped.
pub struct ConfigSession<B: ConfigBackend, C: ClipboardWriter, N: Notifier> {
    ctx: AppContext<B, C, N>,
    directory: DeviceDirectory,
    task_types: Vec<TaskType>,
    selection: TaskSelection,
    document: FormDocument,
    submit_status: Option<SubmitStatus>,
    last_script: Option<ScriptText>,
}

impl<B: ConfigBackend, C: ClipboardWriter, N: Notifier> ConfigSession<B, C, N> {
    pub fn new(ctx: AppContext<B, C, N>) -> Self {
        Self {
            ctx,
            directory: DeviceDirectory::new(),
            task_types: Vec::new(),
            selection: TaskSelection::new(),
            document: FormDocument::new(),
            submit_status: None,
            last_script: None,
        }
    }

    /// Load the device registry and the task catalog.
    pub fn init(&mut self) -> Result<(), AppError> {
        devices::load(&mut self.ctx, &mut self.directory)?;
        self.task_types = catalog::list_task_types(&mut self.ctx, false)?;
        tracing::debug!(
            devices = self.directory.devices().len(),
            task_types = self.task_types.len(),
            "session initialized"
        );
        Ok(())
    }

    pub fn context(&self) -> &AppContext<B, C, N> {
        &self.ctx
    }

    pub fn devices(&self) -> &[Device] {
        self.directory.devices()
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.directory.selected()
    }

    pub fn task_types(&self) -> &[TaskType] {
        &self.task_types
    }

    pub fn selection(&self) -> &TaskSelection {
        &self.selection
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn last_script(&self) -> Option<&ScriptText> {
        self.last_script.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.directory.selected().is_none() {
            return SessionPhase::NoDevice;
        }
        if let Some(status) = self.submit_status {
            return SessionPhase::Submitted(status);
        }
        if self.selection.task_types().next().is_none() {
            return SessionPhase::DeviceSelected;
        }
        if !self.selection.has_any_selection() {
            return SessionPhase::TaskTypePicked;
        }

        let complete = self.selection.selected().all(|(task_type, subtask, _)| {
            self.document
                .parameter_panel(task_type, subtask)
                .is_some_and(|panel| panel.issues().is_empty())
        });
        if complete { SessionPhase::ParametersFilled } else { SessionPhase::SubtaskPicked }
    }

    fn touch(&mut self) {
        self.submit_status = None;
    }

    // Devices

    pub fn refresh_devices(&mut self) -> Result<(), AppError> {
        devices::load(&mut self.ctx, &mut self.directory)
    }

    pub fn select_device(&mut self, name: &str) -> bool {
        let selected = devices::select(&mut self.ctx, &mut self.directory, name);
        if selected {
            self.touch();
        }
        selected
    }

    pub fn add_device(&mut self, draft: DeviceDraft) -> Result<Device, AppError> {
        devices::add(&mut self.ctx, &mut self.directory, draft)
    }

    pub fn edit_device(&mut self, name: &str, draft: DeviceDraft) -> Result<Device, AppError> {
        devices::edit(&mut self.ctx, &mut self.directory, name, draft)
    }

    pub fn delete_device(&mut self, name: &str) -> Result<(), AppError> {
        devices::delete(&mut self.ctx, &mut self.directory, name)
    }

    // Task catalog

    /// Reload the task types, optionally asking the backend to rebuild its catalog.
    pub fn reload_task_types(&mut self, reset: bool) -> Result<&[TaskType], AppError> {
        self.task_types = catalog::list_task_types(&mut self.ctx, reset)?;
        Ok(&self.task_types)
    }

    /// Check a task type and issue the ticket of its subtask load.
    pub fn begin_task_type(&mut self, task_type: &str) -> Result<LoadTicket, AppError> {
        if self.directory.selected().is_none() {
            return Err(AppError::NoDeviceSelected);
        }
        if !self.task_types.is_empty() && !self.task_types.iter().any(|known| known == task_type)
        {
            return Err(AppError::config_error(format!("Unknown task type '{}'", task_type)));
        }
        self.touch();
        Ok(self.selection.select_task_type(task_type))
    }

    pub fn fetch_subtasks(&self, task_type: &str) -> Result<Fetched<Vec<Subtask>>, AppError> {
        catalog::fetch_subtasks(&self.ctx, task_type)
    }

    pub fn finish_task_type(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Fetched<Vec<Subtask>>, AppError>,
    ) -> Result<Applied, AppError> {
        catalog::apply_subtasks(
            &mut self.ctx,
            &mut self.selection,
            &mut self.document,
            ticket,
            result,
        )
    }

    pub fn check_task_type(&mut self, task_type: &str) -> Result<Applied, AppError> {
        let ticket = self.begin_task_type(task_type)?;
        let result = self.fetch_subtasks(task_type);
        self.finish_task_type(&ticket, result)
    }

    /// Uncheck a task type and remove its whole subtree from the document.
    pub fn uncheck_task_type(&mut self, task_type: &str) -> bool {
        let removed = self.selection.deselect_task_type(task_type);
        let panels = self.document.remove_task_type(task_type);
        tracing::debug!(task_type, panels, "task type unchecked");
        self.touch();
        removed
    }

    pub fn begin_subtask(
        &mut self,
        task_type: &str,
        subtask: &str,
    ) -> Result<LoadTicket, AppError> {
        let ticket = self.selection.select_subtask(task_type, subtask)?;
        self.touch();
        Ok(ticket)
    }

    pub fn fetch_parameters(
        &self,
        task_type: &str,
        subtask: &str,
    ) -> Result<Fetched<Vec<ParameterSchema>>, AppError> {
        catalog::fetch_parameters(&self.ctx, task_type, subtask)
    }

    pub fn finish_subtask(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Fetched<Vec<ParameterSchema>>, AppError>,
    ) -> Result<Applied, AppError> {
        form_builder::apply_parameters(
            &mut self.ctx,
            &mut self.selection,
            &mut self.document,
            ticket,
            result,
        )
    }

    pub fn check_subtask(&mut self, task_type: &str, subtask: &str) -> Result<Applied, AppError> {
        let ticket = self.begin_subtask(task_type, subtask)?;
        let result = self.fetch_parameters(task_type, subtask);
        self.finish_subtask(&ticket, result)
    }

    pub fn uncheck_subtask(&mut self, task_type: &str, subtask: &str) -> bool {
        let removed = self.selection.deselect_subtask(task_type, subtask);
        self.document.remove_parameter_panel(task_type, subtask);
        self.touch();
        removed
    }

    /// Store a parameter value and return the inline feedback of its field.
    pub fn set_value(
        &mut self,
        task_type: &str,
        subtask: &str,
        name: &str,
        value: &str,
    ) -> Result<Option<IssueReason>, AppError> {
        let issue = form_builder::update_field(
            &mut self.document,
            &mut self.selection,
            task_type,
            subtask,
            name,
            value,
        )?;
        self.touch();
        Ok(issue)
    }

    // Submission

    /// Register the selected tasks and generate the script of the selected device.
    pub fn submit(&mut self) -> Result<Submission, AppError> {
        let device = self.directory.selected().cloned();
        let result = dispatcher::submit(
            &mut self.ctx,
            device.as_ref(),
            &mut self.selection,
            &mut self.document,
        );
        match result {
            Ok(submission) => {
                self.submit_status = Some(SubmitStatus::Success);
                self.last_script = Some(submission.script.clone());
                Ok(submission)
            }
            Err(err) => {
                if matches!(err, AppError::Network(_) | AppError::Server { .. }) {
                    self.submit_status = Some(SubmitStatus::Failure);
                }
                Err(err)
            }
        }
    }

    /// Copy the last generated script; `false` when the clipboard refused it.
    pub fn copy_script(&mut self) -> Result<bool, AppError> {
        let script = self
            .last_script
            .clone()
            .ok_or_else(|| AppError::config_error("No script has been generated yet"))?;
        Ok(dispatcher::copy_to_clipboard(&mut self.ctx, &script))
    }

    // Registered tasks

    fn selected_device_id(&self) -> Result<String, AppError> {
        self.directory
            .selected()
            .map(|device| device.id().to_string())
            .ok_or(AppError::NoDeviceSelected)
    }

    pub fn tasks(&self) -> Result<Vec<TaskRecord>, AppError> {
        dispatcher::list_tasks(&self.ctx, &self.selected_device_id()?)
    }

    pub fn delete_task(&mut self, index: usize) -> Result<(), AppError> {
        let device_id = self.selected_device_id()?;
        dispatcher::delete_task(&mut self.ctx, &device_id, index)
    }

    pub fn clear_tasks(&mut self) -> Result<(), AppError> {
        let device_id = self.selected_device_id()?;
        dispatcher::clear_tasks(&mut self.ctx, &device_id)
    }

    /// Run the selected device's generated script on the device.
    pub fn execute_script(&mut self) -> Result<ExecutionReport, AppError> {
        let device_id = self.selected_device_id()?;
        dispatcher::execute(&mut self.ctx, &device_id)
    }

    // Rendering

    pub fn render_devices(&self, view: &HtmlView) -> Result<String, AppError> {
        view.device_list(self.directory.devices(), self.directory.selected().map(Device::id))
    }

    pub fn render_form(&self, view: &HtmlView) -> Result<String, AppError> {
        view.document(&self.document, &self.selection)
    }
}
