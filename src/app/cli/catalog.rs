//! `ncm catalog` subcommands.

use clap::Subcommand;
use serde::Serialize;

use super::Globals;
use super::output::OutputFormat;
use crate::adapters::HtmlView;
use crate::app::commands::catalog::substitution_message;
use crate::domain::{
    AppError, ParameterPanel, ParameterSchema, SubtaskPanel, TaskSelection, subtask_label,
    task_type_label,
};

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List the enabled task types
    Types {
        /// Ask the backend to rebuild its catalog first
        #[arg(long)]
        reset: bool,
    },
    /// List the subtasks of a task type
    Subtasks { task_type: String },
    /// Show the parameter form of a subtask
    Params { task_type: String, subtask: String },
}

#[derive(Serialize)]
struct SubtaskListing<'a> {
    task_type: &'a str,
    substitute: Option<&'a str>,
    subtasks: &'a [String],
}

#[derive(Serialize)]
struct ParameterListing<'a> {
    task_type: &'a str,
    subtask: &'a str,
    substitute: Option<&'a str>,
    parameters: &'a [ParameterSchema],
}

pub fn run_catalog(globals: &Globals, command: CatalogCommands) -> Result<(), AppError> {
    let mut session = globals.open()?;

    match command {
        CatalogCommands::Types { reset } => {
            let task_types = session.reload_task_types(reset)?;
            if let Some(encoded) = globals.format.structured(task_types)? {
                println!("{}", encoded);
                return Ok(());
            }
            for task_type in task_types {
                let label = task_type_label(task_type);
                if label == task_type {
                    println!("{}", task_type);
                } else {
                    println!("{} ({})", task_type, label);
                }
            }
            Ok(())
        }
        CatalogCommands::Subtasks { task_type } => {
            let fetched = session.fetch_subtasks(&task_type)?;
            let substitute = fetched.substitute.as_deref();
            let listing =
                SubtaskListing { task_type: &task_type, substitute, subtasks: &fetched.data };
            if let Some(encoded) = globals.format.structured(&listing)? {
                println!("{}", encoded);
                return Ok(());
            }
            if globals.format == OutputFormat::Html {
                let mut panel = SubtaskPanel::new(&task_type, fetched.data.clone());
                panel.notice = substitute.map(|s| substitution_message(&task_type, s));
                println!("{}", HtmlView::new()?.subtask_panel(&panel, &TaskSelection::new())?);
                return Ok(());
            }

            if let Some(substitute) = substitute {
                eprintln!("⚠️  {}", substitution_message(&task_type, substitute));
            }
            for subtask in &fetched.data {
                let label = subtask_label(&task_type, subtask);
                if label == subtask {
                    println!("  {}", subtask);
                } else {
                    println!("  {} ({})", subtask, label);
                }
            }
            Ok(())
        }
        CatalogCommands::Params { task_type, subtask } => {
            let fetched = session.fetch_parameters(&task_type, &subtask)?;
            let substitute = fetched.substitute.as_deref();
            let listing = ParameterListing {
                task_type: &task_type,
                subtask: &subtask,
                substitute,
                parameters: &fetched.data,
            };
            if let Some(encoded) = globals.format.structured(&listing)? {
                println!("{}", encoded);
                return Ok(());
            }

            let (mut panel, rejected) = ParameterPanel::build(&task_type, &subtask, &fetched.data);
            for dropped in &rejected {
                eprintln!("⚠️  {}: invalid pattern '{}' ignored", dropped.field, dropped.pattern);
            }
            if globals.format == OutputFormat::Html {
                panel.notice = substitute.map(|s| substitution_message(&task_type, s));
                println!("{}", HtmlView::new()?.parameter_panel(&panel)?);
                return Ok(());
            }

            if let Some(substitute) = substitute {
                eprintln!("⚠️  {}", substitution_message(&task_type, substitute));
            }
            for field in &panel.fields {
                let mut traits = vec![field.kind.as_str().to_string()];
                if field.required {
                    traits.push("required".to_string());
                }
                if let Some(pattern) = &field.pattern {
                    traits.push(format!("pattern {}", pattern.source()));
                }
                if !field.options.is_empty() {
                    let values: Vec<&str> =
                        field.options.iter().map(|option| option.value.as_str()).collect();
                    traits.push(format!("one of {}", values.join("|")));
                }
                println!("  {:<20} {} [{}]", field.name, field.label, traits.join(", "));
            }
            Ok(())
        }
    }
}
