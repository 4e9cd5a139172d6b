#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::OrgUnitId;
use navet_core::org::{OrgUnit, OrgUnitKind};
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Inserts one unit, resolving the parent by name. The org-tree store is
    /// an external collaborator; this is the ingest side of its contract.
    pub fn org_insert_unit(
        &mut self,
        kind: OrgUnitKind,
        name: &str,
        parent_name: Option<&str>,
    ) -> Result<OrgUnitId, StoreError> {
        let name = normalize_required(name, "org unit name must not be empty")?;
        let tx = self.conn.transaction()?;

        let parent_id: Option<i64> = match parent_name {
            None => None,
            Some(parent) => Some(
                tx.query_row(
                    "SELECT id FROM org_units WHERE name = ?1",
                    params![parent],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(StoreError::UnknownId)?,
            ),
        };

        tx.execute(
            "INSERT INTO org_units(kind, name, parent_id) VALUES (?1, ?2, ?3)",
            params![kind.as_str(), name, parent_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(OrgUnitId::new(id))
    }

    /// Flat snapshot of the whole unit set, ready for `OrgTree::build`.
    pub fn org_units(&mut self) -> Result<Vec<OrgUnit>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, name, parent_id FROM org_units ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?;

        let mut units = Vec::new();
        for row in rows {
            let (id, kind, name, parent_id) = row?;
            let kind = OrgUnitKind::parse(&kind)
                .map_err(|err| StoreError::Corrupt(format!("org_units.kind: {err}")))?;
            units.push(OrgUnit {
                id: OrgUnitId::new(id),
                kind,
                name,
                parent_id: parent_id.map(OrgUnitId::new),
            });
        }
        Ok(units)
    }
}
