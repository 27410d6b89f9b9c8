//! Interactive configuration wizard.

use super::Globals;
use super::prompt;
use super::script::print_submission;
use crate::app::api::{LiveSession, Submission};
use crate::domain::{AppError, FormField, NO_DEVICES_MESSAGE, subtask_label, task_type_label};

pub fn run_configure(globals: &Globals) -> Result<(), AppError> {
    let mut session = globals.connect()?;
    if session.devices().is_empty() {
        println!("{}", NO_DEVICES_MESSAGE);
        return Ok(());
    }

    let labels: Vec<String> = session
        .devices()
        .iter()
        .map(|device| format!("{} ({}, {})", device.name, device.ip, device.model))
        .collect();
    let Some(index) = prompt::select("Device", &labels)? else {
        return Ok(());
    };
    let name = session.devices()[index].name.clone();
    session.select_device(&name);

    loop {
        if !pick_task_type(&mut session)? {
            return Ok(());
        }
        if !prompt::confirm("Add another task type?", false)? {
            break;
        }
    }

    let submission = submit_until_settled(&mut session)?;
    print_submission(globals.format, &submission)?;

    if prompt::confirm("Copy the script to the clipboard?", true)? {
        session.copy_script()?;
    }
    Ok(())
}

const RECOVERY_CHOICES: [&str; 3] = ["Retry", "Edit parameters", "Quit"];

/// Submit, and on failure let the operator retry, fix a value or give up.
///
/// The selection and entered values survive a failed submission, so a retry
/// posts only what the backend does not hold yet. Quitting returns the last error.
fn submit_until_settled(session: &mut LiveSession) -> Result<Submission, AppError> {
    let choices: Vec<String> = RECOVERY_CHOICES.iter().map(|choice| choice.to_string()).collect();
    loop {
        let err = match session.submit() {
            Ok(submission) => return Ok(submission),
            Err(err) => err,
        };
        eprintln!("❌ {}", err);
        loop {
            match prompt::select("Submission failed", &choices)? {
                Some(0) => break,
                Some(1) => {
                    if edit_selection(session)? {
                        break;
                    }
                }
                _ => return Err(err),
            }
        }
    }
}

/// Re-prompt one selected subtask, or pick a task type when nothing is selected.
///
/// Returns `false` when the operator cancelled.
fn edit_selection(session: &mut LiveSession) -> Result<bool, AppError> {
    let pairs: Vec<(String, String)> = session
        .selection()
        .selected()
        .map(|(task_type, subtask, _)| (task_type.to_string(), subtask.to_string()))
        .collect();
    if pairs.is_empty() {
        return pick_task_type(session);
    }

    let labels: Vec<String> = pairs
        .iter()
        .map(|(task_type, subtask)| {
            format!("{} / {}", task_type_label(task_type), subtask_label(task_type, subtask))
        })
        .collect();
    let Some(index) = prompt::select("Edit which task?", &labels)? else {
        return Ok(false);
    };
    let (task_type, subtask) = &pairs[index];
    fill_panel(session, task_type, subtask)
}

/// Returns `false` when the operator cancelled.
fn pick_task_type(session: &mut LiveSession) -> Result<bool, AppError> {
    let task_types = session.task_types().to_vec();
    let labels: Vec<String> =
        task_types.iter().map(|task_type| task_type_label(task_type).to_string()).collect();
    let Some(index) = prompt::select("Task type", &labels)? else {
        return Ok(false);
    };
    let task_type = task_types[index].clone();
    session.check_task_type(&task_type)?;

    let subtasks = session.selection().subtasks(&task_type).to_vec();
    if subtasks.is_empty() {
        println!("No subtasks available for {}", task_type);
        return Ok(true);
    }
    let labels: Vec<String> =
        subtasks.iter().map(|subtask| subtask_label(&task_type, subtask).to_string()).collect();
    let Some(chosen) = prompt::multi_select("Subtasks", &labels)? else {
        return Ok(false);
    };

    for subtask in chosen.into_iter().map(|i| subtasks[i].clone()) {
        if let Err(err) = session.check_subtask(&task_type, &subtask) {
            eprintln!("❌ {}", err);
            continue;
        }
        if !fill_panel(session, &task_type, &subtask)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn fill_panel(
    session: &mut LiveSession,
    task_type: &str,
    subtask: &str,
) -> Result<bool, AppError> {
    let fields: Vec<FormField> = session
        .document()
        .parameter_panel(task_type, subtask)
        .map(|panel| panel.fields.clone())
        .unwrap_or_default();
    if !fields.is_empty() {
        println!("{} / {}", task_type_label(task_type), subtask_label(task_type, subtask));
    }

    for field in &fields {
        let mut prompt_label =
            if field.required { format!("{} *", field.label) } else { field.label.clone() };
        if let Some(hint) = field.placeholder.as_deref().filter(|hint| !hint.is_empty()) {
            prompt_label.push_str(&format!(" ({})", hint));
        }
        loop {
            let current = session
                .document()
                .parameter_panel(task_type, subtask)
                .and_then(|panel| panel.field(&field.name))
                .map(|field| field.value.clone())
                .unwrap_or_default();
            let value = if field.is_select() {
                let options = field.rendered_options();
                let labels: Vec<String> = options.iter().map(|o| o.label.clone()).collect();
                let at = options.iter().position(|o| o.value == current).unwrap_or(0);
                prompt::select_at(&prompt_label, &labels, at)?.map(|i| options[i].value.clone())
            } else {
                prompt::edit_text(&prompt_label, &current)?
            };
            let Some(value) = value else {
                return Ok(false);
            };
            match session.set_value(task_type, subtask, &field.name, &value)? {
                None => break,
                Some(issue) => eprintln!("⚠️  {}", issue.feedback()),
            }
        }
    }
    Ok(true)
}
