use super::record::{
    DecisionRecord, DecisionVerdict, ExecutionOutcome, ExecutionRecord, RequestKind, RequestRecord,
    RequestStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    Conflict,
}

#[derive(Debug, Clone, Default)]
pub struct StatusMutation {
    pub decision: Option<DecisionRecord>,
    pub execution: Option<ExecutionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub status: Option<RequestStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create request database parent {path}: {source}")]
    CreateParent {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sqlite statement failed: {source}")]
    Sql {
        #[source]
        source: rusqlite::Error,
    },
    #[error("invalid request kind `{value}` in database")]
    InvalidKind { value: String },
    #[error("invalid request status `{value}` in database")]
    InvalidStatus { value: String },
    #[error("invalid decision verdict `{value}` in database")]
    InvalidVerdict { value: String },
    #[error("invalid execution outcome `{value}` in database")]
    InvalidOutcome { value: String },
    #[error("invalid json column `{column}` for request `{request_id}`: {source}")]
    InvalidJsonColumn {
        column: &'static str,
        request_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub struct RequestStore {
    db_path: PathBuf,
}

impl RequestStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateParent {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
        };

        let _ = store.connect()?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let connection = self.connect()?;
        connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS requests (
                    request_id TEXT NOT NULL PRIMARY KEY,
                    kind TEXT NOT NULL,
                    subject_identity TEXT NOT NULL,
                    target_resource TEXT NOT NULL,
                    requester_identity TEXT NOT NULL,
                    origin_context TEXT NOT NULL,
                    status TEXT NOT NULL,
                    decision_verdict TEXT,
                    decider_identity TEXT,
                    decided_at INTEGER,
                    outcome TEXT,
                    outcome_detail TEXT,
                    executed_at INTEGER,
                    selection_candidates TEXT NOT NULL DEFAULT '[]',
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_requests_status_created
                    ON requests(status, created_at DESC);
                CREATE INDEX IF NOT EXISTS idx_requests_requester
                    ON requests(requester_identity, status, created_at DESC);

                CREATE TABLE IF NOT EXISTS seen_events (
                    dedup_key TEXT NOT NULL PRIMARY KEY,
                    expires_at INTEGER NOT NULL
                );
                ",
            )
            .map_err(|source| StoreError::Sql { source })?;
        Ok(())
    }

    pub fn create_if_absent(&self, record: &RequestRecord) -> Result<CreateOutcome, StoreError> {
        let connection = self.connect()?;
        let origin_context =
            serde_json::to_string(&record.origin_context).map_err(|source| {
                StoreError::InvalidJsonColumn {
                    column: "origin_context",
                    request_id: record.request_id.clone(),
                    source,
                }
            })?;
        let candidates = serde_json::to_string(&record.selection_candidates).map_err(|source| {
            StoreError::InvalidJsonColumn {
                column: "selection_candidates",
                request_id: record.request_id.clone(),
                source,
            }
        })?;

        let inserted = connection
            .execute(
                "
                INSERT INTO requests (
                    request_id, kind, subject_identity, target_resource,
                    requester_identity, origin_context, status,
                    decision_verdict, decider_identity, decided_at,
                    outcome, outcome_detail, executed_at,
                    selection_candidates, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                ON CONFLICT(request_id) DO NOTHING
                ",
                params![
                    record.request_id,
                    record.kind.as_str(),
                    record.subject_identity,
                    record.target_resource,
                    record.requester_identity,
                    origin_context,
                    record.status.as_str(),
                    record.decision.as_ref().map(|d| d.verdict.as_str()),
                    record.decision.as_ref().map(|d| d.decider_identity.clone()),
                    record.decision.as_ref().map(|d| d.decided_at),
                    record.execution.as_ref().map(|e| e.outcome.as_str()),
                    record.execution.as_ref().map(|e| e.detail.clone()),
                    record.execution.as_ref().map(|e| e.executed_at),
                    candidates,
                    record.created_at,
                    record.updated_at,
                ],
            )
            .map_err(|source| StoreError::Sql { source })?;

        if inserted == 0 {
            return Ok(CreateOutcome::Conflict);
        }
        Ok(CreateOutcome::Created)
    }

    pub fn get(&self, request_id: &str) -> Result<Option<RequestRecord>, StoreError> {
        let connection = self.connect()?;
        let row = connection
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM requests WHERE request_id = ?1"),
                params![request_id],
                raw_record_from_row,
            )
            .optional()
            .map_err(|source| StoreError::Sql { source })?;
        row.map(record_from_raw).transpose()
    }

    // Rows-changed 0 means another invocation already moved the status.
    pub fn update_if_status(
        &self,
        request_id: &str,
        expected: RequestStatus,
        new_status: RequestStatus,
        mutation: &StatusMutation,
        now: i64,
    ) -> Result<CasOutcome, StoreError> {
        let connection = self.connect()?;
        let changed = connection
            .execute(
                "
                UPDATE requests SET
                    status = ?3,
                    updated_at = ?4,
                    decision_verdict = COALESCE(?5, decision_verdict),
                    decider_identity = COALESCE(?6, decider_identity),
                    decided_at = COALESCE(?7, decided_at),
                    outcome = COALESCE(?8, outcome),
                    outcome_detail = COALESCE(?9, outcome_detail),
                    executed_at = COALESCE(?10, executed_at)
                WHERE request_id = ?1 AND status = ?2
                ",
                params![
                    request_id,
                    expected.as_str(),
                    new_status.as_str(),
                    now,
                    mutation.decision.as_ref().map(|d| d.verdict.as_str()),
                    mutation
                        .decision
                        .as_ref()
                        .map(|d| d.decider_identity.clone()),
                    mutation.decision.as_ref().map(|d| d.decided_at),
                    mutation.execution.as_ref().map(|e| e.outcome.as_str()),
                    mutation.execution.as_ref().map(|e| e.detail.clone()),
                    mutation.execution.as_ref().map(|e| e.executed_at),
                ],
            )
            .map_err(|source| StoreError::Sql { source })?;

        if changed == 0 {
            return Ok(CasOutcome::Conflict);
        }
        Ok(CasOutcome::Applied)
    }

    pub fn scan_by(&self, filter: &ScanFilter) -> Result<Vec<RequestRecord>, StoreError> {
        let connection = self.connect()?;
        let limit = filter
            .limit
            .map_or(50, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let mut out = Vec::new();

        match filter.status {
            Some(status) => {
                let mut statement = connection
                    .prepare(&format!(
                        "SELECT {RECORD_COLUMNS} FROM requests
                         WHERE status = ?1
                         ORDER BY created_at DESC, request_id DESC
                         LIMIT ?2"
                    ))
                    .map_err(|source| StoreError::Sql { source })?;
                let rows = statement
                    .query_map(params![status.as_str(), limit], raw_record_from_row)
                    .map_err(|source| StoreError::Sql { source })?;
                for row in rows {
                    out.push(record_from_raw(
                        row.map_err(|source| StoreError::Sql { source })?,
                    )?);
                }
            }
            None => {
                let mut statement = connection
                    .prepare(&format!(
                        "SELECT {RECORD_COLUMNS} FROM requests
                         ORDER BY created_at DESC, request_id DESC
                         LIMIT ?1"
                    ))
                    .map_err(|source| StoreError::Sql { source })?;
                let rows = statement
                    .query_map(params![limit], raw_record_from_row)
                    .map_err(|source| StoreError::Sql { source })?;
                for row in rows {
                    out.push(record_from_raw(
                        row.map_err(|source| StoreError::Sql { source })?,
                    )?);
                }
            }
        }

        Ok(out)
    }

    pub fn find_pending_selection(
        &self,
        requester_identity: &str,
    ) -> Result<Option<RequestRecord>, StoreError> {
        let connection = self.connect()?;
        let row = connection
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM requests
                     WHERE requester_identity = ?1 AND status = ?2
                     ORDER BY created_at DESC, request_id DESC
                     LIMIT 1"
                ),
                params![requester_identity, RequestStatus::PendingSelection.as_str()],
                raw_record_from_row,
            )
            .optional()
            .map_err(|source| StoreError::Sql { source })?;
        row.map(record_from_raw).transpose()
    }

    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        let connection =
            Connection::open(&self.db_path).map_err(|source| StoreError::Open {
                path: self.db_path.display().to_string(),
                source,
            })?;
        connection
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(|source| StoreError::Sql { source })?;
        Ok(connection)
    }
}

const RECORD_COLUMNS: &str = "request_id, kind, subject_identity, target_resource, \
     requester_identity, origin_context, status, decision_verdict, decider_identity, \
     decided_at, outcome, outcome_detail, executed_at, selection_candidates, \
     created_at, updated_at";

struct RawRecord {
    request_id: String,
    kind: String,
    subject_identity: String,
    target_resource: String,
    requester_identity: String,
    origin_context: String,
    status: String,
    decision_verdict: Option<String>,
    decider_identity: Option<String>,
    decided_at: Option<i64>,
    outcome: Option<String>,
    outcome_detail: Option<String>,
    executed_at: Option<i64>,
    selection_candidates: String,
    created_at: i64,
    updated_at: i64,
}

fn raw_record_from_row(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        request_id: row.get(0)?,
        kind: row.get(1)?,
        subject_identity: row.get(2)?,
        target_resource: row.get(3)?,
        requester_identity: row.get(4)?,
        origin_context: row.get(5)?,
        status: row.get(6)?,
        decision_verdict: row.get(7)?,
        decider_identity: row.get(8)?,
        decided_at: row.get(9)?,
        outcome: row.get(10)?,
        outcome_detail: row.get(11)?,
        executed_at: row.get(12)?,
        selection_candidates: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn record_from_raw(raw: RawRecord) -> Result<RequestRecord, StoreError> {
    let kind = RequestKind::parse(&raw.kind).map_err(|_| StoreError::InvalidKind {
        value: raw.kind.clone(),
    })?;
    let status = RequestStatus::parse(&raw.status).map_err(|_| StoreError::InvalidStatus {
        value: raw.status.clone(),
    })?;

    let decision = match (raw.decision_verdict, raw.decider_identity, raw.decided_at) {
        (Some(verdict), Some(decider_identity), Some(decided_at)) => Some(DecisionRecord {
            verdict: DecisionVerdict::parse(&verdict)
                .map_err(|_| StoreError::InvalidVerdict { value: verdict })?,
            decider_identity,
            decided_at,
        }),
        _ => None,
    };

    let execution = match (raw.outcome, raw.outcome_detail, raw.executed_at) {
        (Some(outcome), Some(detail), Some(executed_at)) => Some(ExecutionRecord {
            outcome: ExecutionOutcome::parse(&outcome)
                .map_err(|_| StoreError::InvalidOutcome { value: outcome })?,
            detail,
            executed_at,
        }),
        _ => None,
    };

    let origin_context = serde_json::from_str(&raw.origin_context).map_err(|source| {
        StoreError::InvalidJsonColumn {
            column: "origin_context",
            request_id: raw.request_id.clone(),
            source,
        }
    })?;
    let selection_candidates =
        serde_json::from_str(&raw.selection_candidates).map_err(|source| {
            StoreError::InvalidJsonColumn {
                column: "selection_candidates",
                request_id: raw.request_id.clone(),
                source,
            }
        })?;

    Ok(RequestRecord {
        request_id: raw.request_id,
        kind,
        subject_identity: raw.subject_identity,
        target_resource: raw.target_resource,
        requester_identity: raw.requester_identity,
        origin_context,
        status,
        decision,
        execution,
        selection_candidates,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}
