//! Output formats shared by every subcommand.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
    Html,
}

impl OutputFormat {
    /// Serialize `value` for the structured formats; `None` for text and html.
    pub fn structured<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Option<String>, AppError> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(Some)
                .map_err(|err| AppError::config_error(format!("Failed to encode JSON: {}", err))),
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .map(Some)
                .map_err(|err| AppError::config_error(format!("Failed to encode YAML: {}", err))),
            OutputFormat::Text | OutputFormat::Html => Ok(None),
        }
    }
}
