use super::notify_text::decision_prompt;
use super::WorkflowError;
use crate::notify::Notifier;
use crate::shared::{generate_request_id, log_workflow_event};
use crate::store::{CreateOutcome, RequestKind, RequestRecord, RequestStatus, RequestStore};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub kind: RequestKind,
    pub subject_identity: String,
    pub target_resource: String,
    pub requester_identity: String,
    pub origin_context: Value,
}

pub fn submit(
    store: &RequestStore,
    notifier: &Notifier<'_>,
    state_root: &Path,
    draft: RequestDraft,
    now: i64,
) -> Result<String, WorkflowError> {
    let request_id = generate_request_id(now).map_err(WorkflowError::IdGeneration)?;

    let record = RequestRecord {
        request_id: request_id.clone(),
        kind: draft.kind,
        subject_identity: draft.subject_identity,
        target_resource: draft.target_resource,
        requester_identity: draft.requester_identity,
        origin_context: draft.origin_context,
        status: RequestStatus::Pending,
        decision: None,
        execution: None,
        selection_candidates: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    match store.create_if_absent(&record)? {
        CreateOutcome::Created => {}
        CreateOutcome::Conflict => {
            log_workflow_event(
                state_root,
                &format!("request={request_id} create conflict on fresh id"),
            );
            return Err(WorkflowError::CreateConflict { request_id });
        }
    }

    log_workflow_event(
        state_root,
        &format!(
            "request={} status=pending kind={} subject={} resource={}",
            request_id, record.kind, record.subject_identity, record.target_resource
        ),
    );
    notifier.notify_approvers(&decision_prompt(&record));

    Ok(request_id)
}
