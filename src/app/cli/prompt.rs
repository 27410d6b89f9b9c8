//! Interactive prompts; `Ok(None)` means the operator cancelled.

use std::io::ErrorKind;

use dialoguer::{Confirm, Error as DialoguerError, Input, MultiSelect, Select};

use crate::domain::AppError;

fn cancelled_or<T>(result: Result<T, DialoguerError>, what: &str) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(AppError::config_error(format!("Failed to read {}: {}", what, err))),
    }
}

pub(super) fn text(prompt: &str) -> Result<Option<String>, AppError> {
    edit_text(prompt, "")
}

/// Text input prefilled with `initial`.
pub(super) fn edit_text(prompt: &str, initial: &str) -> Result<Option<String>, AppError> {
    let result = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text();
    cancelled_or(result, prompt)
}

pub(super) fn select(prompt: &str, items: &[String]) -> Result<Option<usize>, AppError> {
    select_at(prompt, items, 0)
}

/// Single choice with the cursor starting on `default`.
pub(super) fn select_at(
    prompt: &str,
    items: &[String],
    default: usize,
) -> Result<Option<usize>, AppError> {
    if items.is_empty() {
        return Ok(None);
    }
    let default = default.min(items.len() - 1);
    let result = Select::new().with_prompt(prompt).items(items).default(default).interact_opt();
    cancelled_or(result, prompt).map(Option::flatten)
}

pub(super) fn multi_select(
    prompt: &str,
    items: &[String],
) -> Result<Option<Vec<usize>>, AppError> {
    let result = MultiSelect::new().with_prompt(prompt).items(items).interact_opt();
    cancelled_or(result, prompt).map(Option::flatten)
}

pub(super) fn confirm(prompt: &str, default: bool) -> Result<bool, AppError> {
    let result = Confirm::new().with_prompt(prompt).default(default).interact_opt();
    Ok(cancelled_or(result, prompt)?.flatten().unwrap_or(false))
}
