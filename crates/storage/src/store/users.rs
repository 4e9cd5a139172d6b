#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::UserId;
use navet_core::model::User;
use navet_core::role::Role;
use rusqlite::{OptionalExtension, Row, params};

struct RawUser {
    id: i64,
    token_identifier: String,
    name: String,
    role: String,
    station: Option<String>,
    area: Option<String>,
    region: Option<String>,
}

fn read_raw_user(row: &Row<'_>) -> Result<RawUser, rusqlite::Error> {
    Ok(RawUser {
        id: row.get(0)?,
        token_identifier: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        station: row.get(4)?,
        area: row.get(5)?,
        region: row.get(6)?,
    })
}

impl RawUser {
    fn into_user(self) -> Result<User, StoreError> {
        let role = Role::parse(&self.role)
            .map_err(|err| StoreError::Corrupt(format!("users.role: {err}")))?;
        Ok(User {
            id: UserId::new(self.id),
            token_identifier: self.token_identifier,
            name: self.name,
            role,
            station: self.station,
            area: self.area,
            region: self.region,
        })
    }
}

const USER_COLUMNS: &str = "id, token_identifier, name, role, station, area, region";

impl SqliteStore {
    /// Create-on-first-contact: inserts a member row if the token is new,
    /// then returns the row either way.
    pub fn user_ensure(&mut self, token_identifier: &str, name: &str) -> Result<User, StoreError> {
        let token = normalize_required(token_identifier, "token_identifier must not be empty")?;
        let name = normalize_required(name, "user name must not be empty")?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO users(token_identifier, name, role) VALUES (?1, ?2, ?3)",
            params![token, name, Role::Member.as_str()],
        )?;
        let raw = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE token_identifier = ?1"),
                params![token],
                read_raw_user,
            )
            .optional()?
            .ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        raw.into_user()
    }

    pub fn user_by_token(&mut self, token_identifier: &str) -> Result<Option<User>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE token_identifier = ?1"),
                params![token_identifier],
                read_raw_user,
            )
            .optional()?
            .map(RawUser::into_user)
            .transpose()
    }

    pub fn user_get(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.as_i64()],
                read_raw_user,
            )
            .optional()?
            .map(RawUser::into_user)
            .transpose()
    }

    pub fn user_set_station(&mut self, id: UserId, station: &str) -> Result<(), StoreError> {
        let station = normalize_required(station, "station must not be empty")?;
        let updated = self.conn.execute(
            "UPDATE users SET station = ?2 WHERE id = ?1",
            params![id.as_i64(), station],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(())
    }

    pub fn user_set_role(&mut self, id: UserId, role: Role) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE users SET role = ?2 WHERE id = ?1",
            params![id.as_i64(), role.as_str()],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownId);
        }
        Ok(())
    }

    pub fn users_all(&mut self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_raw_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_user()?);
        }
        Ok(users)
    }
}
