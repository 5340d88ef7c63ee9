pub mod approval;
pub mod decision;
pub mod executor;
pub mod notify_text;
pub mod selection;
pub mod token;

pub use approval::{submit, RequestDraft};
pub use decision::{handle_decision, DecisionOutcome, WorkflowContext};
pub use executor::{execute, find_similar, ExecutionReport, FailureKind};
pub use selection::{handle_selection_reply, open_selection, SelectionOutcome};
pub use token::{encode_decision_token, parse_decision_token};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to generate request id: {0}")]
    IdGeneration(String),
    #[error("request id `{request_id}` already exists; submission must be retried with a fresh id")]
    CreateConflict { request_id: String },
    #[error("malformed decision token `{token}`: {reason}")]
    MalformedDecision { token: String, reason: String },
    #[error("decision references unknown request `{request_id}`")]
    UnknownRequest { request_id: String },
}
