//! Client configuration loading from the filesystem and environment.

use std::fs;
use std::path::Path;

use url::Url;

use crate::domain::configuration::{CONFIG_FILE, parse_config_content};
use crate::domain::{AppError, ClientConfig};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "NCM_API_URL";

/// Load `ncm.toml` (or `explicit`) and apply the environment override.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<ClientConfig, AppError> {
    let cwd = std::env::current_dir()?;
    let api_url = std::env::var(API_URL_ENV).ok().filter(|value| !value.trim().is_empty());
    load_config_from(explicit, &cwd, api_url.as_deref())
}

pub fn load_config_from(
    explicit: Option<&Path>,
    cwd: &Path,
    api_url: Option<&str>,
) -> Result<ClientConfig, AppError> {
    let mut config = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(AppError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            parse_config_content(&fs::read_to_string(path)?)?
        }
        None => {
            let path = cwd.join(CONFIG_FILE);
            if path.is_file() {
                parse_config_content(&fs::read_to_string(&path)?)?
            } else {
                ClientConfig::default()
            }
        }
    };

    if let Some(raw) = api_url {
        config.api.base_url = Url::parse(raw.trim()).map_err(|err| {
            AppError::InvalidConfig(format!("{} is not a valid URL: {}", API_URL_ENV, err))
        })?;
        config.validate()?;
    }

    tracing::debug!(base_url = %config.api.base_url, prefix = %config.api.prefix, "config loaded");
    Ok(config)
}
