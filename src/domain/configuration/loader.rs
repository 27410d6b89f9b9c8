//! Pure parse/validate for `ncm.toml`.

use crate::domain::{AppError, ClientConfig};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "ncm.toml";

/// Parse and validate client configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<ClientConfig, AppError> {
    let config: ClientConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
