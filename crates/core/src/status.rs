#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostKind {
    Idea,
    Poll,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Idea => "idea",
            PostKind::Poll => "poll",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "idea" => Ok(PostKind::Idea),
            "poll" => Ok(PostKind::Poll),
            other => Err(StatusParseError::UnknownKind(other.to_string())),
        }
    }
}

/// The lifecycle: proposal → voting → approved → workshop → completed.
/// Polls enter at voting. Draft and archived are terminal side-states set
/// outside the lifecycle operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostStatus {
    Draft,
    Proposal,
    Voting,
    Approved,
    Workshop,
    Completed,
    Archived,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Proposal => "proposal",
            PostStatus::Voting => "voting",
            PostStatus::Approved => "approved",
            PostStatus::Workshop => "workshop",
            PostStatus::Completed => "completed",
            PostStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "draft" => Ok(PostStatus::Draft),
            "proposal" => Ok(PostStatus::Proposal),
            "voting" => Ok(PostStatus::Voting),
            "approved" => Ok(PostStatus::Approved),
            "workshop" => Ok(PostStatus::Workshop),
            "completed" => Ok(PostStatus::Completed),
            "archived" => Ok(PostStatus::Archived),
            other => Err(StatusParseError::UnknownStatus(other.to_string())),
        }
    }

    /// Never shown in the public feed.
    pub fn is_hidden(self) -> bool {
        matches!(self, PostStatus::Draft | PostStatus::Archived)
    }

    /// Support votes are accepted during the proposal phase and keep
    /// accumulating after the threshold has escalated the post to voting.
    pub fn accepts_support_votes(self) -> bool {
        matches!(self, PostStatus::Proposal | PostStatus::Voting)
    }

    pub fn accepts_decisive_votes(self) -> bool {
        matches!(self, PostStatus::Voting)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteKind {
    Support,
    Yes,
    No,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Support => "support",
            VoteKind::Yes => "yes",
            VoteKind::No => "no",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "support" => Ok(VoteKind::Support),
            "yes" => Ok(VoteKind::Yes),
            "no" => Ok(VoteKind::No),
            other => Err(StatusParseError::UnknownVote(other.to_string())),
        }
    }

    /// A user holds at most one live vote per post per phase.
    pub fn phase(self) -> VotePhase {
        match self {
            VoteKind::Support => VotePhase::Support,
            VoteKind::Yes | VoteKind::No => VotePhase::Decisive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VotePhase {
    Support,
    Decisive,
}

impl VotePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            VotePhase::Support => "support",
            VotePhase::Decisive => "decisive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Unclaimed,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Unclaimed => "unclaimed",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "unclaimed" => Ok(TaskStatus::Unclaimed),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(StatusParseError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusParseError {
    UnknownKind(String),
    UnknownStatus(String),
    UnknownVote(String),
}

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(value) => write!(f, "unknown post kind: {value}"),
            Self::UnknownStatus(value) => write!(f, "unknown status: {value}"),
            Self::UnknownVote(value) => write!(f, "unknown vote kind: {value}"),
        }
    }
}

impl std::error::Error for StatusParseError {}
