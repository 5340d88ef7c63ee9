use opsdesk::store::{
    CasOutcome, CreateOutcome, DecisionRecord, DecisionVerdict, ExecutionOutcome, ExecutionRecord,
    RequestKind, RequestRecord, RequestStatus, RequestStore, ScanFilter, StatusMutation,
};
use serde_json::json;
use tempfile::tempdir;

fn sample_record(request_id: &str, status: RequestStatus) -> RequestRecord {
    RequestRecord {
        request_id: request_id.to_string(),
        kind: RequestKind::GroupAdd,
        subject_identity: "a@x.com".to_string(),
        target_resource: "Sales".to_string(),
        requester_identity: "requester@x.com".to_string(),
        origin_context: json!({"channel": "C1", "thread": "171.5"}),
        status,
        decision: None,
        execution: None,
        selection_candidates: vec![],
        created_at: 100,
        updated_at: 100,
    }
}

fn open_store(dir: &tempfile::TempDir) -> RequestStore {
    let store = RequestStore::open(&dir.path().join("requests.sqlite3")).expect("open");
    store.ensure_schema().expect("schema");
    store
}

#[test]
fn conditional_create_stores_once_and_conflicts_on_replay() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);

    let record = sample_record("req-1", RequestStatus::Pending);
    assert_eq!(
        store.create_if_absent(&record).expect("first create"),
        CreateOutcome::Created
    );
    assert_eq!(
        store.create_if_absent(&record).expect("second create"),
        CreateOutcome::Conflict
    );

    let loaded = store.get("req-1").expect("get").expect("present");
    assert_eq!(loaded, record);
}

#[test]
fn get_returns_none_for_missing_id() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);
    assert!(store.get("req-missing").expect("get").is_none());
}

#[test]
fn cas_applies_only_from_the_expected_status() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_if_absent(&sample_record("req-1", RequestStatus::Pending))
        .expect("create");

    let decision = StatusMutation {
        decision: Some(DecisionRecord {
            verdict: DecisionVerdict::Approve,
            decider_identity: "alice".to_string(),
            decided_at: 200,
        }),
        execution: None,
    };
    assert_eq!(
        store
            .update_if_status(
                "req-1",
                RequestStatus::Pending,
                RequestStatus::Approved,
                &decision,
                200,
            )
            .expect("cas"),
        CasOutcome::Applied
    );

    // Second racer expecting PENDING loses.
    assert_eq!(
        store
            .update_if_status(
                "req-1",
                RequestStatus::Pending,
                RequestStatus::Approved,
                &decision,
                201,
            )
            .expect("cas"),
        CasOutcome::Conflict
    );

    let loaded = store.get("req-1").expect("get").expect("present");
    assert_eq!(loaded.status, RequestStatus::Approved);
    let recorded = loaded.decision.expect("decision recorded");
    assert_eq!(recorded.decider_identity, "alice");
    assert_eq!(recorded.decided_at, 200);
    assert_eq!(loaded.updated_at, 200);
}

#[test]
fn cas_preserves_earlier_decision_when_mutation_omits_it() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_if_absent(&sample_record("req-1", RequestStatus::Pending))
        .expect("create");

    let decision = StatusMutation {
        decision: Some(DecisionRecord {
            verdict: DecisionVerdict::Approve,
            decider_identity: "alice".to_string(),
            decided_at: 200,
        }),
        execution: None,
    };
    store
        .update_if_status(
            "req-1",
            RequestStatus::Pending,
            RequestStatus::Approved,
            &decision,
            200,
        )
        .expect("approve");
    store
        .update_if_status(
            "req-1",
            RequestStatus::Approved,
            RequestStatus::Executing,
            &StatusMutation::default(),
            201,
        )
        .expect("executing");

    let execution = StatusMutation {
        decision: None,
        execution: Some(ExecutionRecord {
            outcome: ExecutionOutcome::Done,
            detail: "added".to_string(),
            executed_at: 202,
        }),
    };
    store
        .update_if_status(
            "req-1",
            RequestStatus::Executing,
            RequestStatus::Completed,
            &execution,
            202,
        )
        .expect("complete");

    let loaded = store.get("req-1").expect("get").expect("present");
    assert_eq!(loaded.status, RequestStatus::Completed);
    assert_eq!(
        loaded.decision.expect("decision kept").decider_identity,
        "alice"
    );
    let recorded = loaded.execution.expect("execution recorded");
    assert_eq!(recorded.outcome, ExecutionOutcome::Done);
    assert_eq!(recorded.detail, "added");
}

#[test]
fn scan_filters_by_status_and_orders_newest_first() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);

    let mut older = sample_record("req-old", RequestStatus::Pending);
    older.created_at = 100;
    let mut newer = sample_record("req-new", RequestStatus::Pending);
    newer.created_at = 200;
    let mut denied = sample_record("req-denied", RequestStatus::Denied);
    denied.created_at = 150;
    store.create_if_absent(&older).expect("create older");
    store.create_if_absent(&newer).expect("create newer");
    store.create_if_absent(&denied).expect("create denied");

    let pending = store
        .scan_by(&ScanFilter {
            status: Some(RequestStatus::Pending),
            limit: None,
        })
        .expect("scan pending");
    let ids: Vec<&str> = pending.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["req-new", "req-old"]);

    let all = store.scan_by(&ScanFilter::default()).expect("scan all");
    assert_eq!(all.len(), 3);

    let limited = store
        .scan_by(&ScanFilter {
            status: None,
            limit: Some(1),
        })
        .expect("scan limited");
    assert_eq!(limited.len(), 1);
}

#[test]
fn scan_limit_beyond_i64_returns_everything() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_if_absent(&sample_record("req-1", RequestStatus::Pending))
        .expect("create first");
    store
        .create_if_absent(&sample_record("req-2", RequestStatus::Pending))
        .expect("create second");

    let all = store
        .scan_by(&ScanFilter {
            status: None,
            limit: Some(usize::MAX),
        })
        .expect("scan");
    assert_eq!(all.len(), 2);
}

#[test]
fn pending_selection_lookup_returns_newest_for_requester_only() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(&dir);

    let mut older = sample_record("req-sel-old", RequestStatus::PendingSelection);
    older.created_at = 100;
    older.selection_candidates = vec!["Sales-US".to_string()];
    let mut newer = sample_record("req-sel-new", RequestStatus::PendingSelection);
    newer.created_at = 200;
    newer.selection_candidates = vec!["Sales-EU".to_string()];
    let mut other_requester = sample_record("req-sel-other", RequestStatus::PendingSelection);
    other_requester.requester_identity = "someone-else@x.com".to_string();
    other_requester.created_at = 300;
    store.create_if_absent(&older).expect("create older");
    store.create_if_absent(&newer).expect("create newer");
    store.create_if_absent(&other_requester).expect("create other");

    let found = store
        .find_pending_selection("requester@x.com")
        .expect("lookup")
        .expect("present");
    assert_eq!(found.request_id, "req-sel-new");
    assert_eq!(found.selection_candidates, vec!["Sales-EU".to_string()]);

    assert!(store
        .find_pending_selection("nobody@x.com")
        .expect("lookup")
        .is_none());
}
