#![forbid(unsafe_code)]

use crate::error::EngineError;
use navet_core::ids::{NotificationId, PostId, TaskId, UserId};
use navet_core::model::{
    DecisiveOutcome, NewNotification, NewPost, Notification, Post, SupportOutcome, Task, User,
};
use navet_core::org::OrgUnit;
use navet_core::status::{PostStatus, VoteKind};

/// Repository ports. The engine is pure with respect to these: any storage
/// engine can sit behind them (sqlite in production, an in-memory map in
/// tests). Methods that must be atomic under concurrency — the support-vote
/// insert with its threshold flip, the workshop claim, the completion pair —
/// are single port calls so the implementation can wrap them in one
/// transaction.
pub trait OrgRepo {
    fn org_units(&mut self) -> Result<Vec<OrgUnit>, EngineError>;
}

pub trait UserRepo {
    fn user_ensure(&mut self, token_identifier: &str, name: &str) -> Result<User, EngineError>;
    fn user_by_token(&mut self, token_identifier: &str) -> Result<Option<User>, EngineError>;
    fn user_get(&mut self, id: UserId) -> Result<Option<User>, EngineError>;
    fn user_set_station(&mut self, id: UserId, station: &str) -> Result<(), EngineError>;
    fn users_all(&mut self) -> Result<Vec<User>, EngineError>;
}

pub trait PostRepo {
    fn post_insert(&mut self, post: NewPost) -> Result<PostId, EngineError>;
    fn post_get(&mut self, id: PostId) -> Result<Option<Post>, EngineError>;
    /// Newest first, stable.
    fn posts_all_desc(&mut self) -> Result<Vec<Post>, EngineError>;
    /// Compare-and-set; `InvalidTransition` when the post is not in `from`.
    fn post_transition(
        &mut self,
        id: PostId,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<(), EngineError>;
}

pub trait VoteRepo {
    fn cast_support(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        threshold: i64,
    ) -> Result<SupportOutcome, EngineError>;
    fn cast_decisive(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        vote: VoteKind,
    ) -> Result<DecisiveOutcome, EngineError>;
}

pub trait TaskRepo {
    /// Atomic check-and-create; at most one claim ever succeeds per post.
    fn task_claim(
        &mut self,
        post_id: PostId,
        owner_id: UserId,
        description: &str,
    ) -> Result<TaskId, EngineError>;
    fn task_complete(&mut self, task_id: TaskId) -> Result<(), EngineError>;
    fn task_high_five(&mut self, task_id: TaskId, giver_id: UserId) -> Result<(), EngineError>;
    fn task_get(&mut self, task_id: TaskId) -> Result<Option<Task>, EngineError>;
}

pub trait NotificationRepo {
    fn notification_insert_batch(
        &mut self,
        batch: &[NewNotification],
    ) -> Result<Vec<NotificationId>, EngineError>;
    fn notifications_for_user(
        &mut self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, EngineError>;
    fn notification_unread_count(&mut self, user_id: UserId) -> Result<i64, EngineError>;
    fn notification_mark_read(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError>;
    fn notification_mark_all_read(&mut self, user_id: UserId) -> Result<usize, EngineError>;
    fn notification_archive(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError>;
    fn push_subscription_save(
        &mut self,
        user_id: UserId,
        endpoint: &str,
        key_p256dh: &str,
        key_auth: &str,
    ) -> Result<(), EngineError>;
}

pub trait Store: OrgRepo + UserRepo + PostRepo + VoteRepo + TaskRepo + NotificationRepo {}

impl<T> Store for T where
    T: OrgRepo + UserRepo + PostRepo + VoteRepo + TaskRepo + NotificationRepo
{
}
