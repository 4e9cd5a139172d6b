#![forbid(unsafe_code)]

use crate::ids::{NotificationId, PostId, TaskId, UserId};
use crate::role::Role;
use crate::scope::Scope;
use crate::status::{PostKind, PostStatus, TaskStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub token_identifier: String,
    pub name: String,
    pub role: Role,
    pub station: Option<String>,
    /// Override for area managers whose station sits outside the managed area.
    pub area: Option<String>,
    /// Override for region managers, same idea.
    pub region: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub kind: PostKind,
    pub author_id: UserId,
    pub title: String,
    pub description: String,
    pub perfect_state: Option<String>,
    pub resource_needs: Option<String>,
    pub status: PostStatus,
    pub support_count: i64,
    pub target_audience: String,
    pub scope: Scope,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPost {
    pub kind: PostKind,
    pub author_id: UserId,
    pub title: String,
    pub description: String,
    pub perfect_state: Option<String>,
    pub resource_needs: Option<String>,
    pub status: PostStatus,
    pub target_audience: String,
    pub scope: Scope,
}

/// Result of one atomic support-vote insert: the recounted total and whether
/// this vote crossed the threshold and escalated the post to voting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportOutcome {
    pub support_count: i64,
    pub escalated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisiveOutcome {
    Recorded,
    Changed,
    /// Same value cast again; the ledger is untouched.
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub post_id: PostId,
    pub owner_id: Option<UserId>,
    pub description: String,
    pub status: TaskStatus,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: String,
    pub related_id: Option<String>,
    pub is_read: bool,
    pub is_archived: bool,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: String,
    pub related_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushSubscription {
    pub user_id: UserId,
    pub endpoint: String,
    pub key_p256dh: String,
    pub key_auth: String,
}
