//! In-memory task selection of one configuration session.

use std::collections::BTreeMap;

use crate::domain::AppError;
use crate::domain::catalog::{Subtask, TaskType};

/// Parameter values of one subtask, keyed by parameter name.
pub type ParameterValues = BTreeMap<String, String>;

/// Identifies an in-flight catalog load.
///
/// A response is applied only while its ticket is still current; a ticket goes
/// stale when its task type or subtask is deselected or selected again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub task_type: TaskType,
    pub subtask: Option<Subtask>,
    generation: u64,
}

/// Outcome of applying a load response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug, Clone)]
struct SelectedSubtask {
    name: Subtask,
    generation: u64,
    values: ParameterValues,
    /// Posted to the backend with the current values.
    registered: bool,
}

#[derive(Debug, Clone)]
struct TaskEntry {
    task_type: TaskType,
    generation: u64,
    loading: bool,
    subtasks: Vec<Subtask>,
    selected: Vec<SelectedSubtask>,
}

impl TaskEntry {
    fn selected(&self, subtask: &str) -> Option<&SelectedSubtask> {
        self.selected.iter().find(|entry| entry.name == subtask)
    }

    fn selected_mut(&mut self, subtask: &str) -> Option<&mut SelectedSubtask> {
        self.selected.iter_mut().find(|entry| entry.name == subtask)
    }
}

/// Task type → {subtasks loaded, subtasks selected, parameter values}.
#[derive(Debug, Clone, Default)]
pub struct TaskSelection {
    entries: Vec<TaskEntry>,
    next_generation: u64,
}

impl TaskSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn entry(&self, task_type: &str) -> Option<&TaskEntry> {
        self.entries.iter().find(|entry| entry.task_type == task_type)
    }

    fn entry_mut(&mut self, task_type: &str) -> Option<&mut TaskEntry> {
        self.entries.iter_mut().find(|entry| entry.task_type == task_type)
    }

    /// Check a task type and start (or restart) its subtask load.
    pub fn select_task_type(&mut self, task_type: &str) -> LoadTicket {
        let generation = self.issue_generation();
        match self.entry_mut(task_type) {
            Some(entry) => {
                entry.generation = generation;
                entry.loading = true;
            }
            None => self.entries.push(TaskEntry {
                task_type: task_type.to_string(),
                generation,
                loading: true,
                subtasks: Vec::new(),
                selected: Vec::new(),
            }),
        }
        LoadTicket { task_type: task_type.to_string(), subtask: None, generation }
    }

    /// Uncheck a task type, dropping its subtasks and values.
    pub fn deselect_task_type(&mut self, task_type: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.task_type != task_type);
        before != self.entries.len()
    }

    pub fn is_selected(&self, task_type: &str) -> bool {
        self.entry(task_type).is_some()
    }

    /// Whether the subtask list of this task type is being fetched.
    pub fn is_loading(&self, task_type: &str) -> bool {
        self.entry(task_type).is_some_and(|entry| entry.loading)
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        let Some(entry) = self.entry(&ticket.task_type) else {
            return false;
        };
        match &ticket.subtask {
            None => entry.generation == ticket.generation,
            Some(subtask) => {
                entry.selected(subtask).is_some_and(|s| s.generation == ticket.generation)
            }
        }
    }

    /// Store a loaded subtask list; selections missing from the new list are dropped.
    pub fn apply_subtasks(&mut self, ticket: &LoadTicket, subtasks: Vec<Subtask>) -> Applied {
        if ticket.subtask.is_some() || !self.is_current(ticket) {
            return Applied::Stale;
        }
        let Some(entry) = self.entry_mut(&ticket.task_type) else {
            return Applied::Stale;
        };
        entry.selected.retain(|selected| subtasks.contains(&selected.name));
        entry.subtasks = subtasks;
        entry.loading = false;
        Applied::Current
    }

    /// Mark a subtask load as finished without data.
    pub fn abandon_load(&mut self, ticket: &LoadTicket) {
        if ticket.subtask.is_none()
            && self.is_current(ticket)
            && let Some(entry) = self.entry_mut(&ticket.task_type)
        {
            entry.loading = false;
        }
    }

    /// Loaded subtasks of a checked task type.
    pub fn subtasks(&self, task_type: &str) -> &[Subtask] {
        self.entry(task_type).map(|entry| entry.subtasks.as_slice()).unwrap_or(&[])
    }

    /// Check a subtask and start its parameter-schema load.
    pub fn select_subtask(
        &mut self,
        task_type: &str,
        subtask: &str,
    ) -> Result<LoadTicket, AppError> {
        let generation = self.issue_generation();
        let entry = self
            .entry_mut(task_type)
            .ok_or_else(|| AppError::TaskTypeNotSelected(task_type.to_string()))?;

        if !entry.subtasks.iter().any(|candidate| candidate == subtask) {
            return Err(AppError::SubtaskUnavailable {
                task_type: task_type.to_string(),
                subtask: subtask.to_string(),
            });
        }

        match entry.selected_mut(subtask) {
            Some(selected) => selected.generation = generation,
            None => entry.selected.push(SelectedSubtask {
                name: subtask.to_string(),
                generation,
                values: ParameterValues::new(),
                registered: false,
            }),
        }

        Ok(LoadTicket {
            task_type: task_type.to_string(),
            subtask: Some(subtask.to_string()),
            generation,
        })
    }

    /// Uncheck a subtask and forget its parameter values.
    pub fn deselect_subtask(&mut self, task_type: &str, subtask: &str) -> bool {
        let Some(entry) = self.entry_mut(task_type) else {
            return false;
        };
        let before = entry.selected.len();
        entry.selected.retain(|selected| selected.name != subtask);
        before != entry.selected.len()
    }

    pub fn is_subtask_selected(&self, task_type: &str, subtask: &str) -> bool {
        self.entry(task_type).is_some_and(|entry| entry.selected(subtask).is_some())
    }

    pub fn set_parameter(
        &mut self,
        task_type: &str,
        subtask: &str,
        name: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let entry = self
            .entry_mut(task_type)
            .ok_or_else(|| AppError::TaskTypeNotSelected(task_type.to_string()))?;
        let selected = entry.selected_mut(subtask).ok_or_else(|| AppError::SubtaskUnavailable {
            task_type: task_type.to_string(),
            subtask: subtask.to_string(),
        })?;
        if selected.values.get(name).map(String::as_str) != Some(value) {
            selected.values.insert(name.to_string(), value.to_string());
            selected.registered = false;
        }
        Ok(())
    }

    /// Record that the backend holds this subtask with its current values.
    pub fn mark_registered(&mut self, task_type: &str, subtask: &str) -> bool {
        match self.entry_mut(task_type).and_then(|entry| entry.selected_mut(subtask)) {
            Some(selected) => {
                selected.registered = true;
                true
            }
            None => false,
        }
    }

    /// Whether the backend already holds this subtask with its current values.
    pub fn is_registered(&self, task_type: &str, subtask: &str) -> bool {
        self.entry(task_type)
            .and_then(|entry| entry.selected(subtask))
            .is_some_and(|selected| selected.registered)
    }

    pub fn parameters(&self, task_type: &str, subtask: &str) -> Option<&ParameterValues> {
        self.entry(task_type)?.selected(subtask).map(|selected| &selected.values)
    }

    /// Gate of the script generation action.
    pub fn has_any_selection(&self) -> bool {
        self.entries.iter().any(|entry| !entry.selected.is_empty())
    }

    /// Checked task types in selection order.
    pub fn task_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.task_type.as_str())
    }

    /// Every selected (task type, subtask, values) triple in selection order.
    pub fn selected(&self) -> impl Iterator<Item = (&str, &str, &ParameterValues)> {
        self.entries.iter().flat_map(|entry| {
            entry.selected.iter().map(move |selected| {
                (entry.task_type.as_str(), selected.name.as_str(), &selected.values)
            })
        })
    }

    /// Clear entered values; checked task types and subtasks stay.
    pub fn clear_parameters(&mut self) {
        for entry in &mut self.entries {
            for selected in &mut entry.selected {
                selected.values.clear();
                selected.registered = false;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
