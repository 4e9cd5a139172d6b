#![forbid(unsafe_code)]

use navet_core::org::OrgError;
use navet_storage::StoreError;

/// Caller-facing failure taxonomy. Every variant is deterministic and is
/// reported verbatim to the caller; nothing here is retried internally.
#[derive(Debug)]
pub enum EngineError {
    AuthenticationRequired,
    AuthorizationDenied(String),
    NotFound(String),
    InvalidTransition { actual: &'static str },
    DuplicateVote,
    SelfVoteProhibited,
    AlreadyClaimed,
    DuplicateAction,
    Validation(&'static str),
    Org(OrgError),
    Store(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => write!(f, "authentication required"),
            Self::AuthorizationDenied(message) => write!(f, "authorization denied: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::InvalidTransition { actual } => {
                write!(f, "invalid transition (current status: {actual})")
            }
            Self::DuplicateVote => write!(f, "vote already cast"),
            Self::SelfVoteProhibited => write!(f, "authors may not vote on their own post"),
            Self::AlreadyClaimed => write!(f, "someone already claimed this post"),
            Self::DuplicateAction => write!(f, "already done"),
            Self::Validation(message) => write!(f, "validation: {message}"),
            Self::Org(err) => write!(f, "org structure: {err}"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateVote => Self::DuplicateVote,
            StoreError::AlreadyClaimed => Self::AlreadyClaimed,
            StoreError::DuplicateHighFive => Self::DuplicateAction,
            StoreError::TaskAlreadyDone => Self::InvalidTransition { actual: "done" },
            StoreError::StatusConflict { actual } => Self::InvalidTransition {
                actual: actual.as_str(),
            },
            StoreError::UnknownId => Self::NotFound("record not found".to_string()),
            StoreError::InvalidInput(message) => Self::Validation(message),
            other => Self::Store(other),
        }
    }
}

impl From<OrgError> for EngineError {
    fn from(value: OrgError) -> Self {
        match value {
            OrgError::NotFound(name) => Self::NotFound(format!("org unit not found: {name}")),
            other => Self::Org(other),
        }
    }
}
