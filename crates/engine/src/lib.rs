#![forbid(unsafe_code)]

mod dispatch;
mod engine;
mod error;
mod identity;
mod ports;
mod requests;
mod sqlite;
mod visibility;

pub use dispatch::{
    DeliveryError, DeliveryJob, NotificationDispatcher, PushPayload, PushTransport, notify_set,
};
pub use engine::{DEFAULT_SUPPORT_THRESHOLD, LifecycleEngine};
pub use error::EngineError;
pub use identity::{Identity, IdentitySource, StaticIdentitySource};
pub use ports::{NotificationRepo, OrgRepo, PostRepo, Store, TaskRepo, UserRepo, VoteRepo};
pub use requests::{CreatePollRequest, SubmitIdeaRequest};
pub use visibility::filter_posts;
