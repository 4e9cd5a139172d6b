#![forbid(unsafe_code)]

use navet_core::ids::{NotificationId, OrgUnitId, PostId, TaskId, UserId};
use navet_core::model::{
    DecisiveOutcome, NewNotification, NewPost, Notification, Post, SupportOutcome, Task, User,
};
use navet_core::org::{OrgUnit, OrgUnitKind};
use navet_core::role::Role;
use navet_core::status::{PostStatus, TaskStatus, VoteKind, VotePhase};
use navet_engine::{
    EngineError, NotificationRepo, OrgRepo, PostRepo, TaskRepo, UserRepo, VoteRepo,
};
use std::collections::BTreeSet;

/// In-memory implementation of the repository ports, mirroring the sqlite
/// store's semantics. Exists to show the engine never reaches around the
/// port traits.
#[derive(Default)]
pub struct MemStore {
    units: Vec<OrgUnit>,
    users: Vec<User>,
    posts: Vec<Post>,
    votes: Vec<VoteRow>,
    tasks: Vec<Task>,
    high_fives: BTreeSet<(i64, i64)>,
    notifications: Vec<Notification>,
    subscriptions: Vec<(UserId, String, String, String)>,
    next_id: i64,
    clock_ms: i64,
}

struct VoteRow {
    post_id: PostId,
    user_id: UserId,
    phase: VotePhase,
    value: VoteKind,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> i64 {
        self.clock_ms += 1;
        self.clock_ms
    }

    pub fn add_unit(&mut self, kind: OrgUnitKind, name: &str, parent: Option<&str>) {
        let parent_id = parent.map(|parent_name| {
            self.units
                .iter()
                .find(|unit| unit.name == parent_name)
                .map(|unit| unit.id)
                .expect("parent unit exists")
        });
        let id = OrgUnitId::new(self.next_id());
        self.units.push(OrgUnit {
            id,
            kind,
            name: name.to_string(),
            parent_id,
        });
    }

    pub fn subscription_endpoints(&self, user_id: UserId) -> Vec<String> {
        self.subscriptions
            .iter()
            .filter(|(owner, _, _, _)| *owner == user_id)
            .map(|(_, endpoint, _, _)| endpoint.clone())
            .collect()
    }

    pub fn set_role(&mut self, user_id: UserId, role: Role) {
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .expect("user exists");
        user.role = role;
    }

    fn post_mut(&mut self, id: PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id == id)
    }

    fn post_status(&self, id: PostId) -> Result<PostStatus, EngineError> {
        self.posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| post.status)
            .ok_or_else(|| EngineError::NotFound(format!("post not found: {id}")))
    }
}

impl OrgRepo for MemStore {
    fn org_units(&mut self) -> Result<Vec<OrgUnit>, EngineError> {
        Ok(self.units.clone())
    }
}

impl UserRepo for MemStore {
    fn user_ensure(&mut self, token_identifier: &str, name: &str) -> Result<User, EngineError> {
        if let Some(user) = self
            .users
            .iter()
            .find(|user| user.token_identifier == token_identifier)
        {
            return Ok(user.clone());
        }
        let user = User {
            id: UserId::new(self.next_id()),
            token_identifier: token_identifier.to_string(),
            name: name.to_string(),
            role: Role::Member,
            station: None,
            area: None,
            region: None,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    fn user_by_token(&mut self, token_identifier: &str) -> Result<Option<User>, EngineError> {
        Ok(self
            .users
            .iter()
            .find(|user| user.token_identifier == token_identifier)
            .cloned())
    }

    fn user_get(&mut self, id: UserId) -> Result<Option<User>, EngineError> {
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    fn user_set_station(&mut self, id: UserId, station: &str) -> Result<(), EngineError> {
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("user not found: {id}")))?;
        user.station = Some(station.to_string());
        Ok(())
    }

    fn users_all(&mut self) -> Result<Vec<User>, EngineError> {
        Ok(self.users.clone())
    }
}

impl PostRepo for MemStore {
    fn post_insert(&mut self, post: NewPost) -> Result<PostId, EngineError> {
        let id = PostId::new(self.next_id());
        let created_at_ms = self.tick();
        self.posts.push(Post {
            id,
            kind: post.kind,
            author_id: post.author_id,
            title: post.title,
            description: post.description,
            perfect_state: post.perfect_state,
            resource_needs: post.resource_needs,
            status: post.status,
            support_count: 0,
            target_audience: post.target_audience,
            scope: post.scope,
            created_at_ms,
        });
        Ok(id)
    }

    fn post_get(&mut self, id: PostId) -> Result<Option<Post>, EngineError> {
        Ok(self.posts.iter().find(|post| post.id == id).cloned())
    }

    fn posts_all_desc(&mut self) -> Result<Vec<Post>, EngineError> {
        let mut posts = self.posts.clone();
        posts.sort_by(|a, b| {
            (b.created_at_ms, b.id).cmp(&(a.created_at_ms, a.id))
        });
        Ok(posts)
    }

    fn post_transition(
        &mut self,
        id: PostId,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<(), EngineError> {
        let actual = self.post_status(id)?;
        if actual != from {
            return Err(EngineError::InvalidTransition {
                actual: actual.as_str(),
            });
        }
        if let Some(post) = self.post_mut(id) {
            post.status = to;
        }
        Ok(())
    }
}

impl VoteRepo for MemStore {
    fn cast_support(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        threshold: i64,
    ) -> Result<SupportOutcome, EngineError> {
        let status = self.post_status(post_id)?;
        if !status.accepts_support_votes() {
            return Err(EngineError::InvalidTransition {
                actual: status.as_str(),
            });
        }
        let duplicate = self.votes.iter().any(|vote| {
            vote.post_id == post_id && vote.user_id == user_id && vote.phase == VotePhase::Support
        });
        if duplicate {
            return Err(EngineError::DuplicateVote);
        }
        self.votes.push(VoteRow {
            post_id,
            user_id,
            phase: VotePhase::Support,
            value: VoteKind::Support,
        });
        let support_count = self
            .votes
            .iter()
            .filter(|vote| vote.post_id == post_id && vote.phase == VotePhase::Support)
            .count() as i64;
        let escalated = support_count >= threshold && status == PostStatus::Proposal;
        if let Some(post) = self.post_mut(post_id) {
            post.support_count = support_count;
            if escalated {
                post.status = PostStatus::Voting;
            }
        }
        Ok(SupportOutcome {
            support_count,
            escalated,
        })
    }

    fn cast_decisive(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        vote: VoteKind,
    ) -> Result<DecisiveOutcome, EngineError> {
        let status = self.post_status(post_id)?;
        if !status.accepts_decisive_votes() {
            return Err(EngineError::InvalidTransition {
                actual: status.as_str(),
            });
        }
        let existing = self.votes.iter_mut().find(|row| {
            row.post_id == post_id && row.user_id == user_id && row.phase == VotePhase::Decisive
        });
        match existing {
            None => {
                self.votes.push(VoteRow {
                    post_id,
                    user_id,
                    phase: VotePhase::Decisive,
                    value: vote,
                });
                Ok(DecisiveOutcome::Recorded)
            }
            Some(row) if row.value == vote => Ok(DecisiveOutcome::Unchanged),
            Some(row) => {
                row.value = vote;
                Ok(DecisiveOutcome::Changed)
            }
        }
    }
}

impl TaskRepo for MemStore {
    fn task_claim(
        &mut self,
        post_id: PostId,
        owner_id: UserId,
        description: &str,
    ) -> Result<TaskId, EngineError> {
        let status = self.post_status(post_id)?;
        if status != PostStatus::Approved {
            if status == PostStatus::Workshop {
                return Err(EngineError::AlreadyClaimed);
            }
            return Err(EngineError::InvalidTransition {
                actual: status.as_str(),
            });
        }
        if self.tasks.iter().any(|task| task.post_id == post_id) {
            return Err(EngineError::AlreadyClaimed);
        }
        let id = TaskId::new(self.next_id());
        let created_at_ms = self.tick();
        self.tasks.push(Task {
            id,
            post_id,
            owner_id: Some(owner_id),
            description: description.to_string(),
            status: TaskStatus::InProgress,
            created_at_ms,
        });
        if let Some(post) = self.post_mut(post_id) {
            post.status = PostStatus::Workshop;
        }
        Ok(id)
    }

    fn task_complete(&mut self, task_id: TaskId) -> Result<(), EngineError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| EngineError::NotFound(format!("task not found: {task_id}")))?;
        if task.status == TaskStatus::Done {
            return Err(EngineError::InvalidTransition { actual: "done" });
        }
        task.status = TaskStatus::Done;
        let post_id = task.post_id;
        if let Some(post) = self.post_mut(post_id) {
            post.status = PostStatus::Completed;
        }
        Ok(())
    }

    fn task_high_five(&mut self, task_id: TaskId, giver_id: UserId) -> Result<(), EngineError> {
        if !self.tasks.iter().any(|task| task.id == task_id) {
            return Err(EngineError::NotFound(format!("task not found: {task_id}")));
        }
        if !self.high_fives.insert((task_id.as_i64(), giver_id.as_i64())) {
            return Err(EngineError::DuplicateAction);
        }
        Ok(())
    }

    fn task_get(&mut self, task_id: TaskId) -> Result<Option<Task>, EngineError> {
        Ok(self.tasks.iter().find(|task| task.id == task_id).cloned())
    }
}

impl NotificationRepo for MemStore {
    fn notification_insert_batch(
        &mut self,
        batch: &[NewNotification],
    ) -> Result<Vec<NotificationId>, EngineError> {
        let created_at_ms = self.tick();
        let mut ids = Vec::with_capacity(batch.len());
        for item in batch {
            let id = NotificationId::new(self.next_id());
            self.notifications.push(Notification {
                id,
                user_id: item.user_id,
                kind: item.kind.clone(),
                title: item.title.clone(),
                message: item.message.clone(),
                link: item.link.clone(),
                related_id: item.related_id.clone(),
                is_read: false,
                is_archived: false,
                created_at_ms,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    fn notifications_for_user(
        &mut self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, EngineError> {
        let mut rows: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|row| row.user_id == user_id && !row.is_archived)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at_ms, b.id).cmp(&(a.created_at_ms, a.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    fn notification_unread_count(&mut self, user_id: UserId) -> Result<i64, EngineError> {
        Ok(self
            .notifications
            .iter()
            .filter(|row| row.user_id == user_id && !row.is_read && !row.is_archived)
            .count() as i64)
    }

    fn notification_mark_read(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError> {
        let row = self
            .notifications
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id);
        match row {
            Some(row) => {
                row.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn notification_mark_all_read(&mut self, user_id: UserId) -> Result<usize, EngineError> {
        let mut updated = 0;
        for row in &mut self.notifications {
            if row.user_id == user_id && !row.is_read {
                row.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn notification_archive(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, EngineError> {
        let row = self
            .notifications
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id);
        match row {
            Some(row) => {
                row.is_archived = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn push_subscription_save(
        &mut self,
        user_id: UserId,
        endpoint: &str,
        key_p256dh: &str,
        key_auth: &str,
    ) -> Result<(), EngineError> {
        self.subscriptions.retain(|(_, existing, _, _)| existing != endpoint);
        self.subscriptions.push((
            user_id,
            endpoint.to_string(),
            key_p256dh.to_string(),
            key_auth.to_string(),
        ));
        Ok(())
    }
}
