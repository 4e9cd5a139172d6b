#![forbid(unsafe_code)]

use crate::dispatch::{DeliveryJob, NotificationDispatcher, PushPayload, notify_set};
use crate::error::EngineError;
use crate::identity::IdentitySource;
use crate::ports::Store;
use crate::requests::{CreatePollRequest, SubmitIdeaRequest};
use crate::visibility::filter_posts;
use navet_core::ids::{NotificationId, PostId, TaskId};
use navet_core::model::{NewNotification, NewPost, Notification, Post, Task, User};
use navet_core::org::{OrgTree, OrgUnitKind};
use navet_core::scope::{Scope, allowed_targets, creation_targets, scope_of_target};
use navet_core::status::{PostKind, PostStatus, VoteKind, VotePhase};

pub const DEFAULT_SUPPORT_THRESHOLD: i64 = 3;

/// The lifecycle state machine plus the authorization and targeting rules
/// around it. Every operation resolves the calling principal first, then
/// works through the repository ports; the store guarantees atomicity of the
/// contended mutations, the engine guarantees the guards around them.
pub struct LifecycleEngine<S: Store, I: IdentitySource> {
    store: S,
    identity: I,
    dispatcher: NotificationDispatcher,
    threshold: i64,
}

impl<S: Store, I: IdentitySource> LifecycleEngine<S, I> {
    pub fn new(store: S, identity: I, dispatcher: NotificationDispatcher) -> Self {
        Self {
            store,
            identity,
            dispatcher,
            threshold: DEFAULT_SUPPORT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Create-on-first-contact: an authenticated principal gets a member row
    /// the first time it shows up. Station assignment is a separate
    /// onboarding step.
    pub fn ensure_user(&mut self, principal: &str) -> Result<User, EngineError> {
        let identity = self
            .identity
            .resolve(principal)
            .ok_or(EngineError::AuthenticationRequired)?;
        self.store
            .user_ensure(&identity.token_identifier, &identity.display_name)
    }

    /// One-time onboarding gate: a user who already has a station may not be
    /// re-assigned through this path.
    pub fn set_user_station(&mut self, principal: &str, station: &str) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        if user.station.is_some() {
            return Err(EngineError::Validation("station already assigned"));
        }
        let tree = self.org_tree()?;
        match tree.kind_of(station) {
            Some(OrgUnitKind::Station) => {}
            Some(_) => return Err(EngineError::Validation("org unit is not a station")),
            None => {
                return Err(EngineError::NotFound(format!(
                    "org unit not found: {station}"
                )));
            }
        }
        self.store.user_set_station(user.id, station)
    }

    /// The hierarchical feed. A user without a station sees nothing; a
    /// station filter outside the allowed set yields nothing rather than
    /// erroring.
    pub fn list_visible_posts(
        &mut self,
        principal: &str,
        station_filter: Option<&str>,
        completed_only: bool,
    ) -> Result<Vec<Post>, EngineError> {
        let user = self.ensure_user(principal)?;
        let Some(station) = user.station.as_deref() else {
            return Ok(Vec::new());
        };
        let tree = self.org_tree()?;
        let allowed = allowed_targets(&tree, station, user.role)?;
        let posts = self.store.posts_all_desc()?;
        filter_posts(&tree, &allowed, posts, station_filter, completed_only)
    }

    /// Member-submitted ideas start in proposal and gather support votes.
    pub fn submit_idea(
        &mut self,
        principal: &str,
        request: SubmitIdeaRequest,
    ) -> Result<PostId, EngineError> {
        let user = self.ensure_user(principal)?;
        let station = require_station(&user)?.to_string();
        let tree = self.org_tree()?;
        let scope = validate_target(&tree, &user, &station, &request.target_audience)?;

        let post_id = self.store.post_insert(NewPost {
            kind: PostKind::Idea,
            author_id: user.id,
            title: request.title.clone(),
            description: request.description,
            perfect_state: Some(request.perfect_state),
            resource_needs: Some(request.resource_needs),
            status: PostStatus::Proposal,
            target_audience: request.target_audience.clone(),
            scope,
        })?;

        self.fan_out_created(
            &tree,
            post_id,
            PostKind::Idea,
            &request.title,
            &user,
            scope,
            &request.target_audience,
        );
        Ok(post_id)
    }

    /// Manager-initiated polls skip the proposal phase and open in voting.
    pub fn create_poll(
        &mut self,
        principal: &str,
        request: CreatePollRequest,
    ) -> Result<PostId, EngineError> {
        let user = self.ensure_user(principal)?;
        if !user.role.is_manager() {
            return Err(EngineError::AuthorizationDenied(
                "only managers may create polls".to_string(),
            ));
        }
        let station = require_station(&user)?.to_string();
        let tree = self.org_tree()?;
        let scope = validate_target(&tree, &user, &station, &request.target_audience)?;

        let post_id = self.store.post_insert(NewPost {
            kind: PostKind::Poll,
            author_id: user.id,
            title: request.title.clone(),
            description: request.description,
            perfect_state: None,
            resource_needs: None,
            status: PostStatus::Voting,
            target_audience: request.target_audience.clone(),
            scope,
        })?;

        self.fan_out_created(
            &tree,
            post_id,
            PostKind::Poll,
            &request.title,
            &user,
            scope,
            &request.target_audience,
        );
        Ok(post_id)
    }

    /// Support votes accumulate during proposal (and keep accumulating after
    /// the threshold has escalated the post); decisive yes/no votes are a
    /// mutable one-per-user ballot during voting. Authors vote on nothing of
    /// their own.
    pub fn cast_vote(
        &mut self,
        principal: &str,
        post_id: PostId,
        vote: VoteKind,
    ) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        require_station(&user)?;
        let post = self.require_post(post_id)?;
        if post.author_id == user.id {
            return Err(EngineError::SelfVoteProhibited);
        }
        match vote.phase() {
            VotePhase::Support => {
                self.store.cast_support(post_id, user.id, self.threshold)?;
            }
            VotePhase::Decisive => {
                self.store.cast_decisive(post_id, user.id, vote)?;
            }
        }
        Ok(())
    }

    /// voting → approved; manager or admin only.
    pub fn approve_idea(&mut self, principal: &str, post_id: PostId) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        if !user.role.is_manager() {
            return Err(EngineError::AuthorizationDenied(
                "only managers may approve".to_string(),
            ));
        }
        require_station(&user)?;
        self.require_post(post_id)?;
        self.store
            .post_transition(post_id, PostStatus::Voting, PostStatus::Approved)
    }

    /// approved → workshop. The store's check-and-create makes the claim
    /// exclusive; the second claimant gets `AlreadyClaimed`.
    pub fn claim_task(&mut self, principal: &str, post_id: PostId) -> Result<TaskId, EngineError> {
        let user = self.ensure_user(principal)?;
        require_station(&user)?;
        let post = self.require_post(post_id)?;
        self.store.task_claim(post_id, user.id, &post.title)
    }

    /// workshop → completed: task and post flip together in the store.
    pub fn complete_task(&mut self, principal: &str, task_id: TaskId) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        require_station(&user)?;
        self.store.task_complete(task_id)
    }

    /// Idempotent per giver; a repeat is reported as `DuplicateAction` so the
    /// caller can tell the user it was already given.
    pub fn give_high_five(&mut self, principal: &str, task_id: TaskId) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        require_station(&user)?;
        self.store.task_high_five(task_id, user.id)
    }

    pub fn get_task(&mut self, task_id: TaskId) -> Result<Task, EngineError> {
        self.store
            .task_get(task_id)?
            .ok_or_else(|| EngineError::NotFound(format!("task not found: {task_id}")))
    }

    pub fn list_notifications(
        &mut self,
        principal: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, EngineError> {
        let user = self.ensure_user(principal)?;
        self.store.notifications_for_user(user.id, limit)
    }

    pub fn unread_count(&mut self, principal: &str) -> Result<i64, EngineError> {
        let user = self.ensure_user(principal)?;
        self.store.notification_unread_count(user.id)
    }

    /// Ownership-checked: touching someone else's notification reads as
    /// not-found.
    pub fn mark_notification_read(
        &mut self,
        principal: &str,
        id: NotificationId,
    ) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        if !self.store.notification_mark_read(id, user.id)? {
            return Err(EngineError::NotFound(format!("notification not found: {id}")));
        }
        Ok(())
    }

    pub fn mark_all_read(&mut self, principal: &str) -> Result<usize, EngineError> {
        let user = self.ensure_user(principal)?;
        self.store.notification_mark_all_read(user.id)
    }

    pub fn archive_notification(
        &mut self,
        principal: &str,
        id: NotificationId,
    ) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        if !self.store.notification_archive(id, user.id)? {
            return Err(EngineError::NotFound(format!("notification not found: {id}")));
        }
        Ok(())
    }

    pub fn save_push_subscription(
        &mut self,
        principal: &str,
        endpoint: &str,
        key_p256dh: &str,
        key_auth: &str,
    ) -> Result<(), EngineError> {
        let user = self.ensure_user(principal)?;
        self.store
            .push_subscription_save(user.id, endpoint, key_p256dh, key_auth)
    }

    fn org_tree(&mut self) -> Result<OrgTree, EngineError> {
        let units = self.store.org_units()?;
        Ok(OrgTree::build(units)?)
    }

    fn require_post(&mut self, post_id: PostId) -> Result<Post, EngineError> {
        self.store
            .post_get(post_id)?
            .ok_or_else(|| EngineError::NotFound(format!("post not found: {post_id}")))
    }

    /// Fan-out runs after the post is committed. Nothing here may undo the
    /// creation or surface to the caller; failures are logged and dropped.
    fn fan_out_created(
        &mut self,
        tree: &OrgTree,
        post_id: PostId,
        kind: PostKind,
        title: &str,
        author: &User,
        scope: Scope,
        target: &str,
    ) {
        if let Err(err) = self.try_fan_out(tree, post_id, kind, title, author, scope, target) {
            tracing::warn!(post = %post_id, error = %err, "notification fan-out failed");
        }
    }

    fn try_fan_out(
        &mut self,
        tree: &OrgTree,
        post_id: PostId,
        kind: PostKind,
        title: &str,
        author: &User,
        scope: Scope,
        target: &str,
    ) -> Result<(), EngineError> {
        let users = self.store.users_all()?;
        let recipients = notify_set(tree, &users, scope, target, author.id);
        if recipients.is_empty() {
            return Ok(());
        }

        let (notification_kind, headline) = match kind {
            PostKind::Idea => ("new_idea", format!("New idea: {title}")),
            PostKind::Poll => ("new_poll", format!("New poll: {title}")),
        };
        let message = format!("{} posted to {target}", author.name);
        let link = format!("/posts/{post_id}");

        let batch: Vec<NewNotification> = recipients
            .iter()
            .map(|recipient| NewNotification {
                user_id: *recipient,
                kind: notification_kind.to_string(),
                title: headline.clone(),
                message: message.clone(),
                link: link.clone(),
                related_id: Some(post_id.to_string()),
            })
            .collect();
        self.store.notification_insert_batch(&batch)?;

        tracing::debug!(post = %post_id, recipients = recipients.len(), "notification fan-out");
        for recipient in recipients {
            self.dispatcher.enqueue(DeliveryJob {
                user_id: recipient,
                payload: PushPayload {
                    title: headline.clone(),
                    message: message.clone(),
                    link: link.clone(),
                    related_id: Some(post_id.to_string()),
                },
            });
        }
        Ok(())
    }
}

fn require_station(user: &User) -> Result<&str, EngineError> {
    user.station
        .as_deref()
        .ok_or(EngineError::Validation("user has no station"))
}

/// Targeting rules on create. The target must exist; role then bounds which
/// units the user may address; scope falls out of the validated unit's kind.
fn validate_target(
    tree: &OrgTree,
    user: &User,
    station: &str,
    target: &str,
) -> Result<Scope, EngineError> {
    let Some(scope) = scope_of_target(tree, target) else {
        return Err(EngineError::NotFound(format!("org unit not found: {target}")));
    };
    let permitted = creation_targets(
        tree,
        user.role,
        station,
        user.area.as_deref(),
        user.region.as_deref(),
    )?;
    if !permitted.permits(target) {
        return Err(EngineError::AuthorizationDenied(format!(
            "{} may not target {target}",
            user.role.as_str()
        )));
    }
    Ok(scope)
}
