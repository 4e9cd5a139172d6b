#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::{PostId, TaskId, UserId};
use navet_core::model::Task;
use navet_core::status::{PostStatus, TaskStatus};
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};

struct RawTask {
    id: i64,
    post_id: i64,
    owner_id: Option<i64>,
    description: String,
    status: String,
    created_at_ms: i64,
}

fn read_raw_task(row: &Row<'_>) -> Result<RawTask, rusqlite::Error> {
    Ok(RawTask {
        id: row.get(0)?,
        post_id: row.get(1)?,
        owner_id: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}

impl RawTask {
    fn into_task(self) -> Result<Task, StoreError> {
        let status = TaskStatus::parse(&self.status)
            .map_err(|err| StoreError::Corrupt(format!("tasks.status: {err}")))?;
        Ok(Task {
            id: TaskId::new(self.id),
            post_id: PostId::new(self.post_id),
            owner_id: self.owner_id.map(UserId::new),
            description: self.description,
            status,
            created_at_ms: self.created_at_ms,
        })
    }
}

const TASK_COLUMNS: &str = "id, post_id, owner_id, description, status, created_at_ms";

impl SqliteStore {
    /// Atomic check-and-create: the UNIQUE(post_id) index arbitrates between
    /// concurrent claimants, so at most one insert ever lands. The post moves
    /// to workshop in the same transaction.
    pub fn task_claim(
        &mut self,
        post_id: PostId,
        owner_id: UserId,
        description: &str,
    ) -> Result<TaskId, StoreError> {
        let description = normalize_required(description, "task description must not be empty")?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM posts WHERE id = ?1",
                params![post_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(status) = status else {
            return Err(StoreError::UnknownId);
        };
        let status = PostStatus::parse(&status)
            .map_err(|err| StoreError::Corrupt(format!("posts.status: {err}")))?;
        if status != PostStatus::Approved {
            // A post already in workshop means someone else won the claim.
            if status == PostStatus::Workshop {
                return Err(StoreError::AlreadyClaimed);
            }
            return Err(StoreError::StatusConflict { actual: status });
        }

        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO tasks(post_id, owner_id, description, status, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                post_id.as_i64(),
                owner_id.as_i64(),
                description,
                TaskStatus::InProgress.as_str(),
                now_ms()
            ],
        )?;
        if inserted == 0 {
            return Err(StoreError::AlreadyClaimed);
        }
        let task_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE posts SET status = ?2 WHERE id = ?1",
            params![post_id.as_i64(), PostStatus::Workshop.as_str()],
        )?;

        tx.commit()?;
        Ok(TaskId::new(task_id))
    }

    /// Flips the task to done and the post to completed in one transaction.
    pub fn task_complete(&mut self, task_id: TaskId) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row: Option<(i64, String)> = tx
            .query_row(
                "SELECT post_id, status FROM tasks WHERE id = ?1",
                params![task_id.as_i64()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((post_id, status)) = row else {
            return Err(StoreError::UnknownId);
        };
        let status = TaskStatus::parse(&status)
            .map_err(|err| StoreError::Corrupt(format!("tasks.status: {err}")))?;
        if status == TaskStatus::Done {
            return Err(StoreError::TaskAlreadyDone);
        }

        tx.execute(
            "UPDATE tasks SET status = ?2 WHERE id = ?1",
            params![task_id.as_i64(), TaskStatus::Done.as_str()],
        )?;
        tx.execute(
            "UPDATE posts SET status = ?2 WHERE id = ?1",
            params![post_id, PostStatus::Completed.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Idempotent per (task, giver): the composite primary key rejects a
    /// second high-five from the same giver.
    pub fn task_high_five(&mut self, task_id: TaskId, giver_id: UserId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM tasks WHERE id = ?1",
                params![task_id.as_i64()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownId);
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO high_fives(task_id, giver_id) VALUES (?1, ?2)",
            params![task_id.as_i64(), giver_id.as_i64()],
        )?;
        if inserted == 0 {
            return Err(StoreError::DuplicateHighFive);
        }

        tx.commit()?;
        Ok(())
    }

    pub fn task_get(&mut self, task_id: TaskId) -> Result<Option<Task>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![task_id.as_i64()],
                read_raw_task,
            )
            .optional()?
            .map(RawTask::into_task)
            .transpose()
    }

    pub fn task_by_post(&mut self, post_id: PostId) -> Result<Option<Task>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE post_id = ?1"),
                params![post_id.as_i64()],
                read_raw_task,
            )
            .optional()?
            .map(RawTask::into_task)
            .transpose()
    }

    pub fn task_high_fives(&mut self, task_id: TaskId) -> Result<Vec<UserId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT giver_id FROM high_fives WHERE task_id = ?1 ORDER BY giver_id ASC")?;
        let rows = stmt.query_map(params![task_id.as_i64()], |row| row.get::<_, i64>(0))?;
        let mut givers = Vec::new();
        for row in rows {
            givers.push(UserId::new(row?));
        }
        Ok(givers)
    }
}
