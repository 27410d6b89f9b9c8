pub mod catalog;
pub mod configuration;
pub mod device;
pub mod error;
pub mod form;
pub mod notice;
pub mod phase;
pub mod selection;
pub mod task;

pub use catalog::{
    FieldKind, ParameterSchema, SelectOption, Subtask, TaskType, subtask_label, task_type_label,
};
pub use configuration::{ApiConfig, CatalogConfig, ClientConfig};
pub use device::{
    Device, DeviceDraft, NO_DEVICES_MESSAGE, is_valid_ipv4, known_vendors, models_for_vendor,
    normalize_vendor, vendor_label,
};
pub use error::AppError;
pub use form::{
    FieldIssue, FormDocument, FormField, IssueReason, ParameterPanel, RejectedPattern,
    SELECT_PLACEHOLDER, SubtaskPanel, parameter_container_id, subtask_container_id,
};
pub use notice::{Notice, NoticeCode, NoticeLevel};
pub use phase::{SessionPhase, SubmitStatus};
pub use selection::{Applied, LoadTicket, ParameterValues, TaskSelection};
pub use task::{ExecutionReport, ScriptRequest, ScriptTask, ScriptText, TaskRecord, TaskRequest};
