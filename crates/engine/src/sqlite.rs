#![forbid(unsafe_code)]

use crate::error::EngineError;
use crate::ports::{NotificationRepo, OrgRepo, PostRepo, TaskRepo, UserRepo, VoteRepo};
use navet_core::ids::{NotificationId, PostId, TaskId, UserId};
use navet_core::model::{
    DecisiveOutcome, NewNotification, NewPost, Notification, Post, SupportOutcome, Task, User,
};
use navet_core::org::OrgUnit;
use navet_core::status::{PostStatus, VoteKind};
use navet_storage::SqliteStore;

impl OrgRepo for SqliteStore {
    fn org_units(&mut self) -> Result<Vec<OrgUnit>, EngineError> {
        Ok(SqliteStore::org_units(self)?)
    }
}

impl UserRepo for SqliteStore {
    fn user_ensure(&mut self, token_identifier: &str, name: &str) -> Result<User, EngineError> {
        Ok(SqliteStore::user_ensure(self, token_identifier, name)?)
    }

    fn user_by_token(&mut self, token_identifier: &str) -> Result<Option<User>, EngineError> {
        Ok(SqliteStore::user_by_token(self, token_identifier)?)
    }

    fn user_get(&mut self, id: UserId) -> Result<Option<User>, EngineError> {
        Ok(SqliteStore::user_get(self, id)?)
    }

    fn user_set_station(&mut self, id: UserId, station: &str) -> Result<(), EngineError> {
        Ok(SqliteStore::user_set_station(self, id, station)?)
    }

    fn users_all(&mut self) -> Result<Vec<User>, EngineError> {
        Ok(SqliteStore::users_all(self)?)
    }
}

impl PostRepo for SqliteStore {
    fn post_insert(&mut self, post: NewPost) -> Result<PostId, EngineError> {
        Ok(SqliteStore::post_insert(self, post)?)
    }

    fn post_get(&mut self, id: PostId) -> Result<Option<Post>, EngineError> {
        Ok(SqliteStore::post_get(self, id)?)
    }

    fn posts_all_desc(&mut self) -> Result<Vec<Post>, EngineError> {
        Ok(SqliteStore::posts_all_desc(self)?)
    }

    fn post_transition(
        &mut self,
        id: PostId,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<(), EngineError> {
        Ok(SqliteStore::post_transition(self, id, from, to)?)
    }
}

impl VoteRepo for SqliteStore {
    fn cast_support(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        threshold: i64,
    ) -> Result<SupportOutcome, EngineError> {
        Ok(SqliteStore::vote_cast_support(self, post_id, user_id, threshold)?)
    }

    fn cast_decisive(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        vote: VoteKind,
    ) -> Result<DecisiveOutcome, EngineError> {
        Ok(SqliteStore::vote_cast_decisive(self, post_id, user_id, vote)?)
    }
}

impl TaskRepo for SqliteStore {
    fn task_claim(
        &mut self,
        post_id: PostId,
        owner_id: UserId,
        description: &str,
    ) -> Result<TaskId, EngineError> {
        Ok(SqliteStore::task_claim(self, post_id, owner_id, description)?)
    }

    fn task_complete(&mut self, task_id: TaskId) -> Result<(), EngineError> {
        Ok(SqliteStore::task_complete(self, task_id)?)
    }

    fn task_high_five(&mut self, task_id: TaskId, giver_id: UserId) -> Result<(), EngineError> {
        Ok(SqliteStore::task_high_five(self, task_id, giver_id)?)
    }

    fn task_get(&mut self, task_id: TaskId) -> Result<Option<Task>, EngineError> {
        Ok(SqliteStore::task_get(self, task_id)?)
    }
}

impl NotificationRepo for SqliteStore {
    fn notification_insert_batch(
        &mut self,
        batch: &[NewNotification],
    ) -> Result<Vec<NotificationId>, EngineError> {
        Ok(SqliteStore::notification_insert_batch(self, batch)?)
    }

    fn notifications_for_user(
        &mut self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, EngineError> {
        Ok(SqliteStore::notifications_for_user(self, user_id, limit)?)
    }

    fn notification_unread_count(&mut self, user_id: UserId) -> Result<i64, EngineError> {
        Ok(SqliteStore::notification_unread_count(self, user_id)?)
    }

    fn notification_mark_read(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError> {
        Ok(SqliteStore::notification_mark_read(self, id, user_id)?)
    }

    fn notification_mark_all_read(&mut self, user_id: UserId) -> Result<usize, EngineError> {
        Ok(SqliteStore::notification_mark_all_read(self, user_id)?)
    }

    fn notification_archive(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError> {
        Ok(SqliteStore::notification_archive(self, id, user_id)?)
    }

    fn push_subscription_save(
        &mut self,
        user_id: UserId,
        endpoint: &str,
        key_p256dh: &str,
        key_auth: &str,
    ) -> Result<(), EngineError> {
        Ok(SqliteStore::push_subscription_save(
            self, user_id, endpoint, key_p256dh, key_auth,
        )?)
    }
}
