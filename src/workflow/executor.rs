use crate::directory::{DirectoryError, DirectoryService, MembershipChange, MembershipState};
use crate::store::{ExecutionOutcome, RequestKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ResourceNotFound,
    SubjectNotFound,
    UnsupportedKind,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub outcome: ExecutionOutcome,
    pub detail: String,
    pub failure: Option<FailureKind>,
}

impl ExecutionReport {
    fn done(detail: String) -> Self {
        Self {
            outcome: ExecutionOutcome::Done,
            detail,
            failure: None,
        }
    }

    fn already_satisfied(detail: String) -> Self {
        Self {
            outcome: ExecutionOutcome::AlreadySatisfied,
            detail,
            failure: None,
        }
    }

    fn failed(kind: FailureKind, detail: String) -> Self {
        Self {
            outcome: ExecutionOutcome::Failed,
            detail,
            failure: Some(kind),
        }
    }
}

fn desired_change(kind: RequestKind) -> Option<MembershipChange> {
    match kind {
        RequestKind::GroupAdd | RequestKind::MailboxGrant => Some(MembershipChange::Add),
        RequestKind::GroupRemove => Some(MembershipChange::Remove),
        RequestKind::Other => None,
    }
}

pub fn execute(
    directory: &dyn DirectoryService,
    kind: RequestKind,
    subject_identity: &str,
    target_resource: &str,
) -> ExecutionReport {
    let Some(change) = desired_change(kind) else {
        return ExecutionReport::failed(
            FailureKind::UnsupportedKind,
            format!("no executor strategy for request kind `{kind}`"),
        );
    };

    let (subject, state) =
        match resolve_and_check(directory, subject_identity, target_resource) {
            Ok(resolved) => resolved,
            Err(report) => return *report,
        };

    match (state, change) {
        (MembershipState::Member, MembershipChange::Add) => ExecutionReport::already_satisfied(
            format!("`{subject}` is already a member of `{target_resource}`"),
        ),
        (MembershipState::NotMember, MembershipChange::Remove) => {
            ExecutionReport::already_satisfied(format!(
                "`{subject}` is not a member of `{target_resource}`"
            ))
        }
        (MembershipState::Member, MembershipChange::Remove)
        | (MembershipState::NotMember, MembershipChange::Add) => {
            match directory.mutate_membership(&subject, target_resource, change) {
                Ok(()) => ExecutionReport::done(match change {
                    MembershipChange::Add => {
                        format!("added `{subject}` to `{target_resource}`")
                    }
                    MembershipChange::Remove => {
                        format!("removed `{subject}` from `{target_resource}`")
                    }
                }),
                Err(err) => ExecutionReport::failed(
                    FailureKind::Directory,
                    format!("directory mutation failed: {err}"),
                ),
            }
        }
        (MembershipState::SubjectNotFound, _) | (MembershipState::ResourceNotFound, _) => {
            ExecutionReport::failed(
                FailureKind::Directory,
                "unexpected directory state after resolution".to_string(),
            )
        }
    }
}

fn resolve_and_check(
    directory: &dyn DirectoryService,
    subject_identity: &str,
    target_resource: &str,
) -> Result<(String, MembershipState), Box<ExecutionReport>> {
    let state = check(directory, subject_identity, target_resource)?;

    match state {
        MembershipState::ResourceNotFound => Err(Box::new(ExecutionReport::failed(
            FailureKind::ResourceNotFound,
            format!("resource `{target_resource}` was not found in the directory"),
        ))),
        MembershipState::SubjectNotFound => {
            let primary = directory.resolve_alias(subject_identity).map_err(|err| {
                Box::new(ExecutionReport::failed(
                    FailureKind::Directory,
                    format!("alias resolution failed: {err}"),
                ))
            })?;
            let Some(primary) = primary else {
                return Err(Box::new(ExecutionReport::failed(
                    FailureKind::SubjectNotFound,
                    format!("subject `{subject_identity}` was not found in the directory"),
                )));
            };
            let state = check(directory, &primary, target_resource)?;
            match state {
                MembershipState::ResourceNotFound => Err(Box::new(ExecutionReport::failed(
                    FailureKind::ResourceNotFound,
                    format!("resource `{target_resource}` was not found in the directory"),
                ))),
                MembershipState::SubjectNotFound => Err(Box::new(ExecutionReport::failed(
                    FailureKind::SubjectNotFound,
                    format!(
                        "subject `{subject_identity}` (alias of `{primary}`) was not found in the directory"
                    ),
                ))),
                known => Ok((primary, known)),
            }
        }
        known => Ok((subject_identity.to_string(), known)),
    }
}

fn check(
    directory: &dyn DirectoryService,
    subject: &str,
    resource: &str,
) -> Result<MembershipState, Box<ExecutionReport>> {
    directory.check_membership(subject, resource).map_err(|err| {
        Box::new(ExecutionReport::failed(
            FailureKind::Directory,
            format!("membership check failed: {err}"),
        ))
    })
}

pub fn find_similar(
    directory: &dyn DirectoryService,
    resource_name_fragment: &str,
) -> Result<Vec<String>, DirectoryError> {
    directory.search_resources(resource_name_fragment)
}
