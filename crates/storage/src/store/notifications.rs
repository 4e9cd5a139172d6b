#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::{NotificationId, UserId};
use navet_core::model::{NewNotification, Notification};
use rusqlite::{Row, params};

fn read_notification(row: &Row<'_>) -> Result<Notification, rusqlite::Error> {
    Ok(Notification {
        id: NotificationId::new(row.get(0)?),
        user_id: UserId::new(row.get(1)?),
        kind: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        link: row.get(5)?,
        related_id: row.get(6)?,
        is_read: row.get::<_, i64>(7)? != 0,
        is_archived: row.get::<_, i64>(8)? != 0,
        created_at_ms: row.get(9)?,
    })
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, link, related_id, is_read, is_archived, created_at_ms";

impl SqliteStore {
    /// One row per recipient, all in a single transaction.
    pub fn notification_insert_batch(
        &mut self,
        batch: &[NewNotification],
    ) -> Result<Vec<NotificationId>, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(batch.len());
        for item in batch {
            tx.execute(
                r#"
                INSERT INTO notifications(user_id, kind, title, message, link, related_id,
                                          is_read, is_archived, created_at_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7)
                "#,
                params![
                    item.user_id.as_i64(),
                    item.kind,
                    item.title,
                    item.message,
                    item.link,
                    item.related_id,
                    now_ms
                ],
            )?;
            ids.push(NotificationId::new(tx.last_insert_rowid()));
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Unarchived notifications for the user, newest first.
    pub fn notifications_for_user(
        &mut self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = ?1 AND is_archived = 0
            ORDER BY created_at_ms DESC, id DESC
            LIMIT ?2
            "#
        ))?;
        let rows = stmt.query_map(params![user_id.as_i64(), limit as i64], read_notification)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn notification_unread_count(&mut self, user_id: UserId) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0 AND is_archived = 0",
            params![user_id.as_i64()],
            |row| row.get(0),
        )?)
    }

    /// Ownership-checked: only the recipient can mark their notification.
    /// Returns false when the row does not exist or belongs to someone else.
    pub fn notification_mark_read(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let updated = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
            params![id.as_i64(), user_id.as_i64()],
        )?;
        Ok(updated > 0)
    }

    pub fn notification_mark_all_read(&mut self, user_id: UserId) -> Result<usize, StoreError> {
        let updated = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
            params![user_id.as_i64()],
        )?;
        Ok(updated)
    }

    pub fn notification_archive(
        &mut self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let updated = self.conn.execute(
            "UPDATE notifications SET is_archived = 1 WHERE id = ?1 AND user_id = ?2",
            params![id.as_i64(), user_id.as_i64()],
        )?;
        Ok(updated > 0)
    }
}
