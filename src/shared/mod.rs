pub mod ids;
pub mod logging;

pub use ids::{generate_request_id, validate_request_id};
pub use logging::{append_workflow_log_line, log_workflow_event, workflow_log_path};
