//! Sprint rows.

use super::{Database, now_ms, parse_date, parse_enum};
use crate::types::{ProjectId, Sprint, SprintId, SprintStatus};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(crate) const SPRINT_COLUMNS: &str =
    "s.id, s.name, s.goal, s.status, s.start_date, s.end_date, s.project_id, s.created_at";

pub(crate) fn parse_sprint_row(row: &Row) -> rusqlite::Result<Sprint> {
    let status: String = row.get(3)?;
    Ok(Sprint {
        id: row.get(0)?,
        name: row.get(1)?,
        goal: row.get(2)?,
        status: parse_enum::<SprintStatus>(&status, 3)?,
        start_date: parse_date(row.get(4)?)?,
        end_date: parse_date(row.get(5)?)?,
        project: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn get_sprint_internal(conn: &Connection, sprint_id: SprintId) -> Result<Option<Sprint>> {
    let sprint = conn
        .query_row(
            &format!("SELECT {SPRINT_COLUMNS} FROM sprints s WHERE s.id = ?1"),
            params![sprint_id],
            parse_sprint_row,
        )
        .optional()?;
    Ok(sprint)
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

/// Column values for a sprint insert.
#[derive(Debug, Clone)]
pub struct SprintRow {
    pub name: String,
    pub goal: String,
    pub status: SprintStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project: ProjectId,
}

impl Database {
    pub fn insert_sprint(&self, row: SprintRow) -> Result<Sprint> {
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sprints (name, goal, status, start_date, end_date, project_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.name,
                    row.goal,
                    row.status.as_str(),
                    date_text(row.start_date),
                    date_text(row.end_date),
                    row.project,
                    now,
                ],
            )?;

            Ok(Sprint {
                id: conn.last_insert_rowid(),
                name: row.name,
                goal: row.goal,
                status: row.status,
                start_date: row.start_date,
                end_date: row.end_date,
                project: row.project,
                created_at: now,
            })
        })
    }

    /// Unscoped point lookup.
    pub fn get_sprint(&self, sprint_id: SprintId) -> Result<Option<Sprint>> {
        self.with_conn(|conn| get_sprint_internal(conn, sprint_id))
    }

    /// Full update of a sprint row.
    pub fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sprints
                 SET name = ?1, goal = ?2, status = ?3, start_date = ?4, end_date = ?5, project_id = ?6
                 WHERE id = ?7",
                params![
                    sprint.name,
                    sprint.goal,
                    sprint.status.as_str(),
                    date_text(sprint.start_date),
                    date_text(sprint.end_date),
                    sprint.project,
                    sprint.id,
                ],
            )?;
            Ok(())
        })
    }

    /// Delete a sprint. Its tasks stay, with `sprint` cleared.
    pub fn delete_sprint(&self, sprint_id: SprintId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM sprints WHERE id = ?1", params![sprint_id])?;
            Ok(deleted > 0)
        })
    }
}
