#![forbid(unsafe_code)]

mod error;
mod notifications;
mod org;
mod posts;
mod push;
mod tasks;
mod users;
mod votes;

pub use error::StoreError;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "navet.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS org_units (
          id INTEGER PRIMARY KEY,
          kind TEXT NOT NULL,
          name TEXT NOT NULL UNIQUE,
          parent_id INTEGER REFERENCES org_units(id)
        );

        CREATE INDEX IF NOT EXISTS idx_org_units_parent ON org_units(parent_id);
        CREATE INDEX IF NOT EXISTS idx_org_units_kind ON org_units(kind);

        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY,
          token_identifier TEXT NOT NULL UNIQUE,
          name TEXT NOT NULL,
          role TEXT NOT NULL,
          station TEXT,
          area TEXT,
          region TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_users_station ON users(station);

        CREATE TABLE IF NOT EXISTS posts (
          id INTEGER PRIMARY KEY,
          kind TEXT NOT NULL,
          author_id INTEGER NOT NULL REFERENCES users(id),
          title TEXT NOT NULL,
          description TEXT NOT NULL,
          perfect_state TEXT,
          resource_needs TEXT,
          status TEXT NOT NULL,
          support_count INTEGER NOT NULL DEFAULT 0,
          target_audience TEXT NOT NULL,
          scope TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);
        CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_posts_target ON posts(target_audience);

        CREATE TABLE IF NOT EXISTS votes (
          post_id INTEGER NOT NULL REFERENCES posts(id),
          user_id INTEGER NOT NULL REFERENCES users(id),
          phase TEXT NOT NULL,
          value TEXT NOT NULL,
          PRIMARY KEY (post_id, user_id, phase)
        );

        CREATE INDEX IF NOT EXISTS idx_votes_post ON votes(post_id);

        CREATE TABLE IF NOT EXISTS tasks (
          id INTEGER PRIMARY KEY,
          post_id INTEGER NOT NULL UNIQUE REFERENCES posts(id),
          owner_id INTEGER REFERENCES users(id),
          description TEXT NOT NULL,
          status TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);

        CREATE TABLE IF NOT EXISTS high_fives (
          task_id INTEGER NOT NULL REFERENCES tasks(id),
          giver_id INTEGER NOT NULL REFERENCES users(id),
          PRIMARY KEY (task_id, giver_id)
        );

        CREATE TABLE IF NOT EXISTS notifications (
          id INTEGER PRIMARY KEY,
          user_id INTEGER NOT NULL REFERENCES users(id),
          kind TEXT NOT NULL,
          title TEXT NOT NULL,
          message TEXT NOT NULL,
          link TEXT NOT NULL,
          related_id TEXT,
          is_read INTEGER NOT NULL DEFAULT 0,
          is_archived INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_archived);
        CREATE INDEX IF NOT EXISTS idx_notifications_unread ON notifications(user_id, is_read);

        CREATE TABLE IF NOT EXISTS push_subscriptions (
          endpoint TEXT PRIMARY KEY,
          user_id INTEGER NOT NULL REFERENCES users(id),
          key_p256dh TEXT NOT NULL,
          key_auth TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_push_subscriptions_user ON push_subscriptions(user_id);
        "#,
    )?;
    Ok(())
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn normalize_required(raw: &str, field: &'static str) -> Result<String, StoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StoreError::InvalidInput(field));
    }
    Ok(raw.to_string())
}
