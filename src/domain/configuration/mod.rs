pub mod client_config;
pub mod loader;

pub use client_config::{ApiConfig, CatalogConfig, ClientConfig};
pub use loader::{CONFIG_FILE, parse_config_content};
