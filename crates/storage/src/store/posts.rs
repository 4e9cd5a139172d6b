#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::{PostId, UserId};
use navet_core::model::{NewPost, Post};
use navet_core::scope::Scope;
use navet_core::status::{PostKind, PostStatus};
use rusqlite::{OptionalExtension, Row, params};

struct RawPost {
    id: i64,
    kind: String,
    author_id: i64,
    title: String,
    description: String,
    perfect_state: Option<String>,
    resource_needs: Option<String>,
    status: String,
    support_count: i64,
    target_audience: String,
    scope: String,
    created_at_ms: i64,
}

fn read_raw_post(row: &Row<'_>) -> Result<RawPost, rusqlite::Error> {
    Ok(RawPost {
        id: row.get(0)?,
        kind: row.get(1)?,
        author_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        perfect_state: row.get(5)?,
        resource_needs: row.get(6)?,
        status: row.get(7)?,
        support_count: row.get(8)?,
        target_audience: row.get(9)?,
        scope: row.get(10)?,
        created_at_ms: row.get(11)?,
    })
}

impl RawPost {
    fn into_post(self) -> Result<Post, StoreError> {
        let kind = PostKind::parse(&self.kind)
            .map_err(|err| StoreError::Corrupt(format!("posts.kind: {err}")))?;
        let status = PostStatus::parse(&self.status)
            .map_err(|err| StoreError::Corrupt(format!("posts.status: {err}")))?;
        let scope = Scope::parse(&self.scope)
            .map_err(|err| StoreError::Corrupt(format!("posts.scope: {err}")))?;
        Ok(Post {
            id: PostId::new(self.id),
            kind,
            author_id: UserId::new(self.author_id),
            title: self.title,
            description: self.description,
            perfect_state: self.perfect_state,
            resource_needs: self.resource_needs,
            status,
            support_count: self.support_count,
            target_audience: self.target_audience,
            scope,
            created_at_ms: self.created_at_ms,
        })
    }
}

const POST_COLUMNS: &str = "id, kind, author_id, title, description, perfect_state, \
     resource_needs, status, support_count, target_audience, scope, created_at_ms";

impl SqliteStore {
    pub fn post_insert(&mut self, post: NewPost) -> Result<PostId, StoreError> {
        let title = normalize_required(&post.title, "title must not be empty")?;
        let description = normalize_required(&post.description, "description must not be empty")?;
        let target = normalize_required(&post.target_audience, "target audience must not be empty")?;

        self.conn.execute(
            r#"
            INSERT INTO posts(
              kind, author_id, title, description, perfect_state, resource_needs,
              status, support_count, target_audience, scope, created_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10)
            "#,
            params![
                post.kind.as_str(),
                post.author_id.as_i64(),
                title,
                description,
                post.perfect_state,
                post.resource_needs,
                post.status.as_str(),
                target,
                post.scope.as_str(),
                now_ms()
            ],
        )?;
        Ok(PostId::new(self.conn.last_insert_rowid()))
    }

    pub fn post_get(&mut self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id.as_i64()],
                read_raw_post,
            )
            .optional()?
            .map(RawPost::into_post)
            .transpose()
    }

    /// Newest first; id breaks creation-time ties so the order is stable.
    pub fn posts_all_desc(&mut self) -> Result<Vec<Post>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at_ms DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], read_raw_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?.into_post()?);
        }
        Ok(posts)
    }

    /// Compare-and-set status transition. Returns the actual status in the
    /// error when the post was not in the expected source state.
    pub fn post_transition(
        &mut self,
        id: PostId,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let actual: Option<String> = tx
            .query_row(
                "SELECT status FROM posts WHERE id = ?1",
                params![id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(actual) = actual else {
            return Err(StoreError::UnknownId);
        };
        let actual = PostStatus::parse(&actual)
            .map_err(|err| StoreError::Corrupt(format!("posts.status: {err}")))?;
        if actual != from {
            return Err(StoreError::StatusConflict { actual });
        }
        tx.execute(
            "UPDATE posts SET status = ?2 WHERE id = ?1",
            params![id.as_i64(), to.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }
}
