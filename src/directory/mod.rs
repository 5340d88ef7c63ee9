pub mod api;

pub use api::DirectoryApiClient;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory api request failed: {0}")]
    ApiRequest(String),
    #[error("directory api responded with error `{0}`")]
    ApiResponse(String),
    #[error("directory api returned unknown membership state `{0}`")]
    UnknownMembershipState(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    Member,
    NotMember,
    SubjectNotFound,
    ResourceNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Remove,
}

impl MembershipChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

// Every check is live; implementations must not cache membership state.
pub trait DirectoryService {
    fn check_membership(
        &self,
        subject: &str,
        resource: &str,
    ) -> Result<MembershipState, DirectoryError>;

    fn mutate_membership(
        &self,
        subject: &str,
        resource: &str,
        change: MembershipChange,
    ) -> Result<(), DirectoryError>;

    fn search_resources(&self, name_fragment: &str) -> Result<Vec<String>, DirectoryError>;

    fn resolve_alias(&self, subject: &str) -> Result<Option<String>, DirectoryError>;
}
