pub mod record;
pub mod repository;

pub use record::{
    DecisionRecord, DecisionVerdict, ExecutionOutcome, ExecutionRecord, RequestKind, RequestRecord,
    RequestStatus,
};
pub use repository::{
    CasOutcome, CreateOutcome, RequestStore, ScanFilter, StatusMutation, StoreError,
};
