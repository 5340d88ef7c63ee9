use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    GroupAdd,
    GroupRemove,
    MailboxGrant,
    Other,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GroupAdd => "group_add",
            Self::GroupRemove => "group_remove",
            Self::MailboxGrant => "mailbox_grant",
            Self::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "group_add" => Ok(Self::GroupAdd),
            "group_remove" => Ok(Self::GroupRemove),
            "mailbox_grant" => Ok(Self::MailboxGrant),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown request kind `{raw}`")),
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    PendingSelection,
    Approved,
    Executing,
    Completed,
    Failed,
    Denied,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingSelection => "pending_selection",
            Self::Approved => "approved",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Denied => "denied",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "pending" => Ok(Self::Pending),
            "pending_selection" => Ok(Self::PendingSelection),
            "approved" => Ok(Self::Approved),
            "executing" => Ok(Self::Executing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("unknown request status `{raw}`")),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Denied)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionVerdict {
    Approve,
    Deny,
}

impl DecisionVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "approve" => Ok(Self::Approve),
            "deny" => Ok(Self::Deny),
            _ => Err(format!("unknown decision verdict `{raw}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Done,
    AlreadySatisfied,
    Failed,
}

impl ExecutionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::AlreadySatisfied => "already_satisfied",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "done" => Ok(Self::Done),
            "already_satisfied" => Ok(Self::AlreadySatisfied),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown execution outcome `{raw}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub verdict: DecisionVerdict,
    pub decider_identity: String,
    pub decided_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub outcome: ExecutionOutcome,
    pub detail: String,
    pub executed_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub request_id: String,
    pub kind: RequestKind,
    pub subject_identity: String,
    pub target_resource: String,
    pub requester_identity: String,
    // Opaque to the core; handed as-is to the notification sink.
    #[serde(default)]
    pub origin_context: Value,
    pub status: RequestStatus,
    #[serde(default)]
    pub decision: Option<DecisionRecord>,
    #[serde(default)]
    pub execution: Option<ExecutionRecord>,
    #[serde(default)]
    pub selection_candidates: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
