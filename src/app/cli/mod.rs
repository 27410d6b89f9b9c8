//! CLI Adapter.

mod catalog;
mod configure;
mod devices;
mod output;
mod prompt;
mod script;
mod tasks;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::adapters::TerminalNotifier;
use crate::app::api::{self, LiveSession};
use crate::domain::AppError;

pub use output::OutputFormat;

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "NCM_LOG";

#[derive(Parser)]
#[command(name = "ncm")]
#[command(version)]
#[command(
    about = "Register network devices, fill task parameters and generate configuration scripts",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./ncm.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    /// Print debug logs (-vv for dependencies too)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage registered devices
    #[clap(visible_alias = "d")]
    Devices {
        #[command(subcommand)]
        command: devices::DeviceCommands,
    },
    /// Browse task types, subtasks and parameter forms
    #[clap(visible_alias = "c")]
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },
    /// Manage tasks registered for a device
    #[clap(visible_alias = "t")]
    Tasks {
        #[command(subcommand)]
        command: tasks::TaskCommands,
    },
    /// Generate configuration scripts
    #[clap(visible_alias = "s")]
    Script {
        #[command(subcommand)]
        command: script::ScriptCommands,
    },
    /// Pick a device, tasks and parameters interactively
    Configure,
}

/// Options shared by every subcommand.
pub(crate) struct Globals {
    config: Option<PathBuf>,
    format: OutputFormat,
}

impl Globals {
    fn notifier(&self) -> TerminalNotifier {
        match self.format {
            OutputFormat::Text => TerminalNotifier::new(),
            _ => TerminalNotifier::quiet(),
        }
    }

    /// Session without initial loads.
    fn open(&self) -> Result<LiveSession, AppError> {
        api::open_session(self.config.as_deref(), self.notifier())
    }

    /// Session with devices and task types loaded.
    fn connect(&self) -> Result<LiveSession, AppError> {
        api::connect(self.config.as_deref(), self.notifier())
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("ncm=debug"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let globals = Globals { config: cli.config, format: cli.format };
    let result: Result<(), AppError> = match cli.command {
        Commands::Devices { command } => devices::run_devices(&globals, command),
        Commands::Catalog { command } => catalog::run_catalog(&globals, command),
        Commands::Tasks { command } => tasks::run_tasks(&globals, command),
        Commands::Script { command } => script::run_script(&globals, command),
        Commands::Configure => configure::run_configure(&globals),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "ncm",
            "script",
            "generate",
            "-t",
            "VLAN 설정",
            "-s",
            "create",
            "-p",
            "vlan_id=10",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Script { command: script::ScriptCommands::Generate { subtasks, .. } } => {
                assert_eq!(subtasks, vec!["create".to_string()]);
            }
            _ => panic!("expected script generate"),
        }
    }

    #[test]
    fn script_generate_requires_a_subtask() {
        assert!(Cli::try_parse_from(["ncm", "script", "generate", "-t", "VLAN 설정"]).is_err());
    }
}
