//! `ncm script` subcommands.

use clap::Subcommand;
use serde::Serialize;

use super::Globals;
use super::output::OutputFormat;
use super::prompt;
use super::tasks::select_device;
use crate::adapters::HtmlView;
use crate::app::api::{self, ScriptJob, Submission};
use crate::domain::AppError;

#[derive(Subcommand)]
pub enum ScriptCommands {
    /// Register tasks for a device and print the generated script
    #[clap(visible_alias = "g")]
    Generate {
        /// Device name (defaults to the first registered device)
        #[arg(short, long)]
        device: Option<String>,
        /// Task type, e.g. "VLAN 설정"
        #[arg(short = 't', long = "task-type")]
        task_type: String,
        /// Subtask to include; repeat for several
        #[arg(short, long = "subtask", required = true)]
        subtasks: Vec<String>,
        /// Parameter as name=value; repeat for several
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Copy the script to the clipboard
        #[arg(short, long)]
        copy: bool,
    },
    /// Run the generated script of a device on the device
    #[clap(visible_alias = "x")]
    Execute {
        /// Device name (defaults to the first registered device)
        #[arg(short, long)]
        device: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Serialize)]
struct ScriptOutput<'a> {
    device_id: &'a str,
    registered: usize,
    script: &'a str,
}

pub fn run_script(globals: &Globals, command: ScriptCommands) -> Result<(), AppError> {
    match command {
        ScriptCommands::Generate { device, task_type, subtasks, params, copy } => {
            let params = params
                .iter()
                .map(|raw| api::parse_param(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let job = ScriptJob { device, task_type, subtasks, params, copy };

            let mut session = globals.connect()?;
            let submission = api::run_script_job(&mut session, &job)?;
            print_submission(globals.format, &submission)
        }
        ScriptCommands::Execute { device, yes } => {
            let mut session = globals.open()?;
            let name = select_device(&mut session, device.as_deref())?;
            if !yes && !prompt::confirm(&format!("Run the script of '{}' now?", name), false)? {
                println!("Cancelled");
                return Ok(());
            }
            let report = session.execute_script()?;
            if let Some(encoded) = globals.format.structured(&report)? {
                println!("{}", encoded);
                return Ok(());
            }
            if let Some(output) = &report.output {
                println!("{}", output);
            }
            Ok(())
        }
    }
}

pub(super) fn print_submission(
    format: OutputFormat,
    submission: &Submission,
) -> Result<(), AppError> {
    let output = ScriptOutput {
        device_id: &submission.device_id,
        registered: submission.registered,
        script: submission.script.as_str(),
    };
    if let Some(encoded) = format.structured(&output)? {
        println!("{}", encoded);
        return Ok(());
    }
    if format == OutputFormat::Html {
        println!("{}", HtmlView::new()?.script(&submission.device_id, &submission.script)?);
        return Ok(());
    }

    eprintln!(
        "✅ Registered {} task(s) for {}; generated {} line(s)",
        submission.registered,
        submission.device_id,
        submission.script.line_count()
    );
    println!("{}", submission.script);
    Ok(())
}
