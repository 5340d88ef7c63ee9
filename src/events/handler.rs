use super::dedup::{dedup_key, seen};
use super::message::{Ack, InboundEvent};
use crate::directory::DirectoryService;
use crate::notify::Notifier;
use crate::shared::log_workflow_event;
use crate::store::{RequestStore, StoreError};
use crate::workflow::{
    handle_decision, handle_selection_reply, submit, RequestDraft, WorkflowContext, WorkflowError,
};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    DirectoryChange(RequestDraft),
    Other,
}

pub trait IntentClassifier {
    fn classify(&self, sender_identity: &str, channel_context: &Value, text: &str) -> Intent;
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Workflow(WorkflowError),
}

pub struct EventHandler<'a> {
    pub store: &'a RequestStore,
    pub directory: &'a dyn DirectoryService,
    pub notifier: &'a Notifier<'a>,
    pub classifier: &'a dyn IntentClassifier,
    pub state_root: &'a Path,
    pub dedup_ttl_secs: i64,
}

impl EventHandler<'_> {
    pub fn handle_event(&self, event: &InboundEvent, now: i64) -> Result<Ack, HandlerError> {
        let key = dedup_key(event);
        if seen(self.store, &key, now, self.dedup_ttl_secs)? {
            log_workflow_event(self.state_root, &format!("event={key} duplicate delivery"));
            return Ok(Ack::Duplicate);
        }

        let ctx = WorkflowContext {
            store: self.store,
            directory: self.directory,
            notifier: self.notifier,
            state_root: self.state_root,
        };

        match event {
            InboundEvent::Decision {
                decision_token,
                decider_identity,
                ..
            } => match handle_decision(&ctx, decision_token, decider_identity, now) {
                Ok(_) => Ok(Ack::Processed),
                Err(err @ WorkflowError::MalformedDecision { .. }) => {
                    log_workflow_event(self.state_root, &format!("event={key} dropped: {err}"));
                    Ok(Ack::Ignored(err.to_string()))
                }
                Err(err @ WorkflowError::UnknownRequest { .. }) => {
                    log_workflow_event(self.state_root, &format!("event={key} dropped: {err}"));
                    Ok(Ack::Ignored(err.to_string()))
                }
                Err(other) => Err(HandlerError::Workflow(other)),
            },
            InboundEvent::Message {
                sender_identity,
                channel_context,
                text,
                ..
            } => {
                if let Some(outcome) =
                    handle_selection_reply(&ctx, sender_identity, text, now)
                        .map_err(HandlerError::Workflow)?
                {
                    log_workflow_event(
                        self.state_root,
                        &format!("event={key} resolved selection reply: {outcome:?}"),
                    );
                    return Ok(Ack::Processed);
                }

                match self.classifier.classify(sender_identity, channel_context, text) {
                    Intent::DirectoryChange(draft) => {
                        let request_id = submit(self.store, self.notifier, self.state_root, draft, now)
                            .map_err(HandlerError::Workflow)?;
                        log_workflow_event(
                            self.state_root,
                            &format!("event={key} opened request={request_id}"),
                        );
                        Ok(Ack::Processed)
                    }
                    Intent::Other => Ok(Ack::Ignored(
                        "message carries no directory-change intent".to_string(),
                    )),
                }
            }
        }
    }
}
