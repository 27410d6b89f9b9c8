//! ncm: terminal client for a network-device configuration management backend.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{LiveSession, ScriptJob, Submission, connect, open_session, run_script_job};
pub use app::{AppContext, ConfigSession};
pub use domain::AppError;
