//! Filesystem and environment backed configuration loading.
//!
//! Pure schema parsing lives in `domain::configuration`.

mod load_config;

pub use load_config::{API_URL_ENV, load_config, load_config_from};
