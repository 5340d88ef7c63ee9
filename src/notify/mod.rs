pub mod webhook;

pub use webhook::WebhookSink;

use crate::shared::log_workflow_event;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(String),
    #[error("notification sink responded with error `{0}`")]
    Response(String),
}

pub trait NotificationSink {
    fn notify(&self, destination: &Value, text: &str) -> Result<(), NotifyError>;
}

pub struct Notifier<'a> {
    sink: &'a dyn NotificationSink,
    audit_destination: Value,
    approvers_destination: Value,
    state_root: PathBuf,
}

impl<'a> Notifier<'a> {
    pub fn new(
        sink: &'a dyn NotificationSink,
        audit_channel: &str,
        approvers_channel: &str,
        state_root: PathBuf,
    ) -> Self {
        Self {
            sink,
            audit_destination: json!({ "channel": audit_channel }),
            approvers_destination: json!({ "channel": approvers_channel }),
            state_root,
        }
    }

    pub fn notify_requester(&self, origin_context: &Value, text: &str) {
        if let Err(err) = self.sink.notify(origin_context, text) {
            log_workflow_event(
                &self.state_root,
                &format!("requester notification failed: {err}"),
            );
        }
    }

    pub fn notify_audit(&self, text: &str) {
        if let Err(err) = self.sink.notify(&self.audit_destination, text) {
            log_workflow_event(
                &self.state_root,
                &format!("audit notification failed: {err}"),
            );
        }
    }

    pub fn notify_approvers(&self, text: &str) {
        if let Err(err) = self.sink.notify(&self.approvers_destination, text) {
            log_workflow_event(
                &self.state_root,
                &format!("approver notification failed: {err}"),
            );
        }
    }
}
