#![forbid(unsafe_code)]

use navet_core::status::PostStatus;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    /// A stored value no longer parses as its domain type.
    Corrupt(String),
    UnknownId,
    DuplicateVote,
    AlreadyClaimed,
    DuplicateHighFive,
    TaskAlreadyDone,
    /// The post was not in the status the operation requires.
    StatusConflict { actual: PostStatus },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Corrupt(message) => write!(f, "corrupt row: {message}"),
            Self::UnknownId => write!(f, "unknown id"),
            Self::DuplicateVote => write!(f, "duplicate vote"),
            Self::AlreadyClaimed => write!(f, "task already claimed"),
            Self::DuplicateHighFive => write!(f, "high-five already given"),
            Self::TaskAlreadyDone => write!(f, "task already done"),
            Self::StatusConflict { actual } => {
                write!(f, "status conflict (actual={})", actual.as_str())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
