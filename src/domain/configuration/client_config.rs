//! Client configuration domain models.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;

/// Configuration loaded from `ncm.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Backend API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Task catalog behavior.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.api.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Backend origin, e.g. `http://127.0.0.1:5000`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Route prefix shared by every endpoint.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum attempts for idempotent requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(AppError::InvalidConfig(format!(
                "base_url must use http or https, got '{}'",
                self.base_url.scheme()
            )));
        }
        if !self.prefix.is_empty() && !self.prefix.starts_with('/') {
            return Err(AppError::InvalidConfig("prefix must start with '/'".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidConfig("timeout_secs must be greater than 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(AppError::InvalidConfig("max_retries must be greater than 0".to_string()));
        }
        if self.retry_delay_ms == 0 {
            return Err(AppError::InvalidConfig(
                "retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalized prefix without a trailing slash.
    pub fn route_prefix(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:5000").expect("Default base URL must be valid")
}

fn default_prefix() -> String {
    "/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    250
}

/// Task catalog behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Task types substituted, in order, when a subtask or parameter load fails.
    #[serde(default = "default_fallback_task_types")]
    pub fallback_task_types: Vec<String>,
    /// Ask the backend for bare task type names.
    #[serde(default)]
    pub names_only: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { fallback_task_types: default_fallback_task_types(), names_only: false }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.fallback_task_types.iter().any(|task_type| task_type.trim().is_empty()) {
            return Err(AppError::InvalidConfig(
                "fallback_task_types must not contain empty names".to_string(),
            ));
        }
        Ok(())
    }

    /// First fallback that differs from the task type that just failed.
    pub fn fallback_for(&self, failed: &str) -> Option<&str> {
        self.fallback_task_types
            .iter()
            .map(String::as_str)
            .find(|candidate| *candidate != failed)
    }
}

fn default_fallback_task_types() -> Vec<String> {
    vec!["포트 설정".to_string(), "인터페이스 설정".to_string()]
}
