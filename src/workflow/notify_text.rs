use crate::store::{
    DecisionVerdict, ExecutionOutcome, RequestKind, RequestRecord, RequestStatus,
};
use crate::workflow::token::encode_decision_token;

fn action_phrase(kind: RequestKind, resource: &str) -> String {
    match kind {
        RequestKind::GroupAdd => format!("add to group `{resource}`"),
        RequestKind::GroupRemove => format!("remove from group `{resource}`"),
        RequestKind::MailboxGrant => format!("grant access to mailbox `{resource}`"),
        RequestKind::Other => format!("change `{resource}`"),
    }
}

pub fn decision_prompt(record: &RequestRecord) -> String {
    let approve = encode_decision_token(DecisionVerdict::Approve, &record.request_id);
    let deny = encode_decision_token(DecisionVerdict::Deny, &record.request_id);
    format!(
        "Approval needed: {} requests to {} for `{}`.\nApprove: {}\nDeny: {}",
        record.requester_identity,
        action_phrase(record.kind, &record.target_resource),
        record.subject_identity,
        approve,
        deny,
    )
}

// Raw failure detail goes to the audit channel only.
pub fn requester_outcome_text(record: &RequestRecord, outcome: ExecutionOutcome) -> String {
    match (outcome, record.kind) {
        (ExecutionOutcome::Done, RequestKind::GroupAdd) => format!(
            "`{}` was added to `{}`.",
            record.subject_identity, record.target_resource
        ),
        (ExecutionOutcome::Done, RequestKind::GroupRemove) => format!(
            "`{}` was removed from `{}`.",
            record.subject_identity, record.target_resource
        ),
        (ExecutionOutcome::Done, _) => format!(
            "Your request for `{}` on `{}` was completed.",
            record.subject_identity, record.target_resource
        ),
        (ExecutionOutcome::AlreadySatisfied, _) => format!(
            "No change was needed: `{}` already has the requested access to `{}`.",
            record.subject_identity, record.target_resource
        ),
        (ExecutionOutcome::Failed, _) => format!(
            "Your request for `{}` on `{}` could not be completed. The IT team has been notified.",
            record.subject_identity, record.target_resource
        ),
    }
}

pub fn requester_denied_text(record: &RequestRecord) -> String {
    format!(
        "Your request to {} for `{}` was denied.",
        action_phrase(record.kind, &record.target_resource),
        record.subject_identity
    )
}

pub fn requester_pending_text(record: &RequestRecord) -> String {
    format!(
        "Your request to {} for `{}` is awaiting a decision.",
        action_phrase(record.kind, &record.target_resource),
        record.subject_identity
    )
}

pub fn audit_outcome_text(
    record: &RequestRecord,
    decider: &str,
    outcome: ExecutionOutcome,
    detail: &str,
) -> String {
    let result = match outcome {
        ExecutionOutcome::Done => "completed",
        ExecutionOutcome::AlreadySatisfied => "completed (already satisfied)",
        ExecutionOutcome::Failed => "failed",
    };
    format!(
        "request {} approved by {}; execution {}: {}",
        record.request_id, decider, result, detail
    )
}

pub fn audit_denied_text(record: &RequestRecord, decider: &str) -> String {
    format!("request {} denied by {}", record.request_id, decider)
}

pub fn audit_selection_text(
    record: &RequestRecord,
    chosen: &str,
    outcome: ExecutionOutcome,
    detail: &str,
) -> String {
    let result = match outcome {
        ExecutionOutcome::Done => "completed",
        ExecutionOutcome::AlreadySatisfied => "completed (already satisfied)",
        ExecutionOutcome::Failed => "failed",
    };
    format!(
        "request {} resolved `{}` to `{}` by requester reply; execution {}: {}",
        record.request_id, record.target_resource, chosen, result, detail
    )
}

pub fn duplicate_decision_text(record: &RequestRecord) -> String {
    match record.status {
        RequestStatus::Denied => requester_denied_text(record),
        RequestStatus::Completed | RequestStatus::Failed => {
            let outcome = record
                .execution
                .as_ref()
                .map(|e| e.outcome)
                .unwrap_or(ExecutionOutcome::Failed);
            requester_outcome_text(record, outcome)
        }
        RequestStatus::Approved | RequestStatus::Executing => format!(
            "Request {} is already being processed.",
            record.request_id
        ),
        RequestStatus::Pending | RequestStatus::PendingSelection => {
            requester_pending_text(record)
        }
    }
}

pub fn selection_prompt(original_resource: &str, candidates: &[String]) -> String {
    let listed = candidates
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "`{original_resource}` was not found. Did you mean one of these? Reply with the exact name.\n{listed}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> RequestRecord {
        RequestRecord {
            request_id: "req-1".to_string(),
            kind: RequestKind::GroupAdd,
            subject_identity: "a@x.com".to_string(),
            target_resource: "Sales".to_string(),
            requester_identity: "a@x.com".to_string(),
            origin_context: json!({}),
            status: RequestStatus::Pending,
            decision: None,
            execution: None,
            selection_candidates: vec![],
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn decision_prompt_embeds_both_tokens() {
        let prompt = decision_prompt(&sample_record());
        assert!(prompt.contains("approve-req-1"));
        assert!(prompt.contains("deny-req-1"));
        assert!(prompt.contains("Sales"));
    }

    #[test]
    fn fresh_add_and_already_member_read_differently() {
        let record = sample_record();
        let added = requester_outcome_text(&record, ExecutionOutcome::Done);
        let already = requester_outcome_text(&record, ExecutionOutcome::AlreadySatisfied);
        assert_ne!(added, already);
        assert!(added.contains("added"));
        assert!(already.contains("already"));
    }

    #[test]
    fn requester_failure_text_is_sanitized() {
        let record = sample_record();
        let text = requester_outcome_text(&record, ExecutionOutcome::Failed);
        assert!(!text.contains("directory"));
        assert!(text.contains("could not be completed"));
    }

    #[test]
    fn selection_prompt_lists_candidates_verbatim() {
        let prompt = selection_prompt(
            "Sales",
            &["Sales-US".to_string(), "Sales-EU".to_string()],
        );
        assert!(prompt.contains("- Sales-US"));
        assert!(prompt.contains("- Sales-EU"));
    }
}
