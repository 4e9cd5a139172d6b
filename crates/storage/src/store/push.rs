#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::UserId;
use navet_core::model::PushSubscription;
use rusqlite::params;

impl SqliteStore {
    /// Upsert keyed by endpoint; a re-login from another account re-binds
    /// the subscription to the new user.
    pub fn push_subscription_save(
        &mut self,
        user_id: UserId,
        endpoint: &str,
        key_p256dh: &str,
        key_auth: &str,
    ) -> Result<(), StoreError> {
        let endpoint = normalize_required(endpoint, "endpoint must not be empty")?;
        self.conn.execute(
            r#"
            INSERT INTO push_subscriptions(endpoint, user_id, key_p256dh, key_auth)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(endpoint) DO UPDATE SET
              user_id = excluded.user_id,
              key_p256dh = excluded.key_p256dh,
              key_auth = excluded.key_auth
            "#,
            params![endpoint, user_id.as_i64(), key_p256dh, key_auth],
        )?;
        Ok(())
    }

    pub fn push_subscriptions_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<PushSubscription>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, endpoint, key_p256dh, key_auth FROM push_subscriptions WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id.as_i64()], |row| {
            Ok(PushSubscription {
                user_id: UserId::new(row.get(0)?),
                endpoint: row.get(1)?,
                key_p256dh: row.get(2)?,
                key_auth: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Prunes a dead delivery endpoint. Returns false when it was already gone.
    pub fn push_subscription_remove(&mut self, endpoint: &str) -> Result<bool, StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM push_subscriptions WHERE endpoint = ?1",
            params![endpoint],
        )?;
        Ok(deleted > 0)
    }
}
