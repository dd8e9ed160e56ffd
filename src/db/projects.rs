//! Project rows.
//!
//! These are unscoped primitives; callers reach them only after a scoped
//! lookup in [`super::scope`] or an ownership check.

use super::{Database, now_ms};
use crate::types::{Project, ProjectId, UserId};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub const DEFAULT_PROJECT_COLOR: &str = "bg-primary";

pub(crate) fn parse_project_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        owner: row.get("owner_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn get_project_internal(
    conn: &Connection,
    project_id: ProjectId,
) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT * FROM projects WHERE id = ?1",
            params![project_id],
            parse_project_row,
        )
        .optional()?;
    Ok(project)
}

impl Database {
    pub fn insert_project(&self, owner: UserId, name: &str, color: Option<&str>) -> Result<Project> {
        let now = now_ms();
        let color = color.unwrap_or(DEFAULT_PROJECT_COLOR);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (name, color, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![name, color, owner, now],
            )?;

            Ok(Project {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                color: color.to_string(),
                owner,
                created_at: now,
            })
        })
    }

    /// Unscoped point lookup.
    pub fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>> {
        self.with_conn(|conn| get_project_internal(conn, project_id))
    }

    /// Full update of the mutable project fields.
    pub fn save_project(&self, project: &Project) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE projects SET name = ?1, color = ?2 WHERE id = ?3",
                params![project.name, project.color, project.id],
            )?;
            Ok(())
        })
    }

    /// Delete a project. Its sprints and tasks go with it.
    pub fn delete_project(&self, project_id: ProjectId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
            Ok(deleted > 0)
        })
    }
}
