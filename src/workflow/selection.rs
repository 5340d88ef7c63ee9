use super::decision::WorkflowContext;
use super::executor::{execute, find_similar};
use super::notify_text::{audit_selection_text, requester_outcome_text, selection_prompt};
use super::WorkflowError;
use crate::shared::{generate_request_id, log_workflow_event};
use crate::store::{
    CasOutcome, CreateOutcome, ExecutionOutcome, ExecutionRecord, RequestRecord, RequestStatus,
    StatusMutation,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Executed {
        request_id: String,
        outcome: ExecutionOutcome,
    },
    Duplicate { request_id: String },
}

pub fn open_selection(
    ctx: &WorkflowContext<'_>,
    original: &RequestRecord,
    now: i64,
) -> Result<Option<String>, WorkflowError> {
    let candidates = match find_similar(ctx.directory, &original.target_resource) {
        Ok(candidates) => candidates,
        Err(err) => {
            log_workflow_event(
                ctx.state_root,
                &format!(
                    "request={} candidate search failed: {err}",
                    original.request_id
                ),
            );
            return Ok(None);
        }
    };
    if candidates.is_empty() {
        return Ok(None);
    }

    let request_id = generate_request_id(now).map_err(WorkflowError::IdGeneration)?;
    let record = RequestRecord {
        request_id: request_id.clone(),
        kind: original.kind,
        subject_identity: original.subject_identity.clone(),
        target_resource: original.target_resource.clone(),
        requester_identity: original.requester_identity.clone(),
        origin_context: original.origin_context.clone(),
        status: RequestStatus::PendingSelection,
        decision: None,
        execution: None,
        selection_candidates: candidates.clone(),
        created_at: now,
        updated_at: now,
    };

    match ctx.store.create_if_absent(&record)? {
        CreateOutcome::Created => {}
        CreateOutcome::Conflict => {
            return Err(WorkflowError::CreateConflict { request_id });
        }
    }

    log_workflow_event(
        ctx.state_root,
        &format!(
            "request={} status=pending_selection origin={} candidates={}",
            request_id,
            original.request_id,
            candidates.join(",")
        ),
    );
    ctx.notifier.notify_requester(
        &original.origin_context,
        &selection_prompt(&original.target_resource, &candidates),
    );

    Ok(Some(request_id))
}

pub fn handle_selection_reply(
    ctx: &WorkflowContext<'_>,
    requester_identity: &str,
    text: &str,
    now: i64,
) -> Result<Option<SelectionOutcome>, WorkflowError> {
    let Some(record) = ctx.store.find_pending_selection(requester_identity)? else {
        return Ok(None);
    };

    let reply = text.trim();
    let Some(chosen) = record
        .selection_candidates
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(reply))
        .cloned()
    else {
        return Ok(None);
    };

    match ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::PendingSelection,
        RequestStatus::Executing,
        &StatusMutation::default(),
        now,
    )? {
        CasOutcome::Conflict => {
            return Ok(Some(SelectionOutcome::Duplicate {
                request_id: record.request_id,
            }))
        }
        CasOutcome::Applied => {}
    }

    log_workflow_event(
        ctx.state_root,
        &format!(
            "request={} status=executing selected={}",
            record.request_id, chosen
        ),
    );

    let report = execute(
        ctx.directory,
        record.kind,
        &record.subject_identity,
        &chosen,
    );

    let final_status = match report.outcome {
        ExecutionOutcome::Failed => RequestStatus::Failed,
        ExecutionOutcome::Done | ExecutionOutcome::AlreadySatisfied => RequestStatus::Completed,
    };
    let mutation = StatusMutation {
        decision: None,
        execution: Some(ExecutionRecord {
            outcome: report.outcome,
            detail: report.detail.clone(),
            executed_at: now,
        }),
    };
    if let CasOutcome::Conflict = ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::Executing,
        final_status,
        &mutation,
        now,
    )? {
        log_workflow_event(
            ctx.state_root,
            &format!(
                "request={} lost executing transition unexpectedly",
                record.request_id
            ),
        );
    }

    log_workflow_event(
        ctx.state_root,
        &format!(
            "request={} status={} outcome={} detail={}",
            record.request_id,
            final_status,
            report.outcome.as_str(),
            report.detail
        ),
    );

    let mut resolved = record.clone();
    resolved.target_resource = chosen.clone();
    ctx.notifier.notify_requester(
        &record.origin_context,
        &requester_outcome_text(&resolved, report.outcome),
    );
    ctx.notifier.notify_audit(&audit_selection_text(
        &record,
        &chosen,
        report.outcome,
        &report.detail,
    ));

    Ok(Some(SelectionOutcome::Executed {
        request_id: record.request_id,
        outcome: report.outcome,
    }))
}
