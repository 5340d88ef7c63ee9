use super::executor::{execute, FailureKind};
use super::notify_text::{
    audit_denied_text, audit_outcome_text, duplicate_decision_text, requester_denied_text,
    requester_outcome_text,
};
use super::selection::open_selection;
use super::token::parse_decision_token;
use super::WorkflowError;
use crate::directory::DirectoryService;
use crate::notify::Notifier;
use crate::shared::log_workflow_event;
use crate::store::{
    CasOutcome, DecisionRecord, DecisionVerdict, ExecutionOutcome, ExecutionRecord, RequestRecord,
    RequestStatus, RequestStore, StatusMutation,
};
use std::path::Path;

pub struct WorkflowContext<'a> {
    pub store: &'a RequestStore,
    pub directory: &'a dyn DirectoryService,
    pub notifier: &'a Notifier<'a>,
    pub state_root: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Denied {
        request_id: String,
    },
    Executed {
        request_id: String,
        outcome: ExecutionOutcome,
    },
    Duplicate {
        request_id: String,
        status: RequestStatus,
    },
}

pub fn handle_decision(
    ctx: &WorkflowContext<'_>,
    decision_token: &str,
    decider_identity: &str,
    now: i64,
) -> Result<DecisionOutcome, WorkflowError> {
    let (verdict, request_id) =
        parse_decision_token(decision_token).map_err(|reason| WorkflowError::MalformedDecision {
            token: decision_token.to_string(),
            reason,
        })?;

    let Some(record) = ctx.store.get(&request_id)? else {
        return Err(WorkflowError::UnknownRequest { request_id });
    };

    if record.status != RequestStatus::Pending {
        return Ok(emit_duplicate(ctx, &record));
    }

    let decision = DecisionRecord {
        verdict,
        decider_identity: decider_identity.to_string(),
        decided_at: now,
    };

    match verdict {
        DecisionVerdict::Deny => deny(ctx, &record, decision, now),
        DecisionVerdict::Approve => approve(ctx, &record, decision, now),
    }
}

fn deny(
    ctx: &WorkflowContext<'_>,
    record: &RequestRecord,
    decision: DecisionRecord,
    now: i64,
) -> Result<DecisionOutcome, WorkflowError> {
    let decider = decision.decider_identity.clone();
    let mutation = StatusMutation {
        decision: Some(decision),
        execution: None,
    };
    match ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::Pending,
        RequestStatus::Denied,
        &mutation,
        now,
    )? {
        CasOutcome::Conflict => return reload_as_duplicate(ctx, &record.request_id),
        CasOutcome::Applied => {}
    }

    log_workflow_event(
        ctx.state_root,
        &format!("request={} status=denied decider={}", record.request_id, decider),
    );
    ctx.notifier
        .notify_requester(&record.origin_context, &requester_denied_text(record));
    ctx.notifier.notify_audit(&audit_denied_text(record, &decider));

    Ok(DecisionOutcome::Denied {
        request_id: record.request_id.clone(),
    })
}

fn approve(
    ctx: &WorkflowContext<'_>,
    record: &RequestRecord,
    decision: DecisionRecord,
    now: i64,
) -> Result<DecisionOutcome, WorkflowError> {
    let decider = decision.decider_identity.clone();

    let mutation = StatusMutation {
        decision: Some(decision),
        execution: None,
    };
    match ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::Pending,
        RequestStatus::Approved,
        &mutation,
        now,
    )? {
        CasOutcome::Conflict => return reload_as_duplicate(ctx, &record.request_id),
        CasOutcome::Applied => {}
    }

    match ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::Approved,
        RequestStatus::Executing,
        &StatusMutation::default(),
        now,
    )? {
        CasOutcome::Conflict => return reload_as_duplicate(ctx, &record.request_id),
        CasOutcome::Applied => {}
    }

    log_workflow_event(
        ctx.state_root,
        &format!(
            "request={} status=executing decider={}",
            record.request_id, decider
        ),
    );

    let report = execute(
        ctx.directory,
        record.kind,
        &record.subject_identity,
        &record.target_resource,
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
    match ctx.store.update_if_status(
        &record.request_id,
        RequestStatus::Executing,
        final_status,
        &mutation,
        now,
    )? {
        CasOutcome::Applied => {}
        CasOutcome::Conflict => {
            log_workflow_event(
                ctx.state_root,
                &format!(
                    "request={} lost executing transition unexpectedly",
                    record.request_id
                ),
            );
        }
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

    ctx.notifier.notify_requester(
        &record.origin_context,
        &requester_outcome_text(record, report.outcome),
    );
    ctx.notifier.notify_audit(&audit_outcome_text(
        record,
        &decider,
        report.outcome,
        &report.detail,
    ));

    if report.failure == Some(FailureKind::ResourceNotFound) {
        open_selection(ctx, record, now)?;
    }

    Ok(DecisionOutcome::Executed {
        request_id: record.request_id.clone(),
        outcome: report.outcome,
    })
}

fn reload_as_duplicate(
    ctx: &WorkflowContext<'_>,
    request_id: &str,
) -> Result<DecisionOutcome, WorkflowError> {
    let Some(record) = ctx.store.get(request_id)? else {
        return Err(WorkflowError::UnknownRequest {
            request_id: request_id.to_string(),
        });
    };
    Ok(emit_duplicate(ctx, &record))
}

fn emit_duplicate(ctx: &WorkflowContext<'_>, record: &RequestRecord) -> DecisionOutcome {
    log_workflow_event(
        ctx.state_root,
        &format!(
            "request={} duplicate decision in status={}",
            record.request_id, record.status
        ),
    );
    ctx.notifier
        .notify_requester(&record.origin_context, &duplicate_decision_text(record));
    DecisionOutcome::Duplicate {
        request_id: record.request_id.clone(),
        status: record.status,
    }
}
