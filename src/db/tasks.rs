//! Task rows: insert, full update, targeted completion patch, delete.

use super::{Database, now_ms, parse_date, parse_enum};
use crate::types::{
    Priority, ProfileId, ProjectId, SprintId, Task, TaskId, TaskStatus, UserProfile,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Task columns plus the assignee profile, resolved through LEFT JOINs.
/// Callers append their own JOIN/WHERE clauses.
pub(crate) const TASK_SELECT: &str = "SELECT
        t.id, t.title, t.description, t.completed, t.status, t.priority,
        t.due_date, t.completed_at, t.created_at, t.updated_at,
        t.project_id, t.sprint_id,
        ap.id, ap.user_id, au.username, ap.bio, ap.avatar
    FROM tasks t
    LEFT JOIN user_profiles ap ON ap.id = t.assigned_to
    LEFT JOIN users au ON au.id = ap.user_id";

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get(4)?;
    let priority: String = row.get(5)?;

    let profile_id: Option<ProfileId> = row.get(12)?;
    let assigned_to = match profile_id {
        Some(id) => Some(UserProfile {
            id,
            user_id: row.get(13)?,
            username: row.get(14)?,
            bio: row.get(15)?,
            avatar: row.get(16)?,
        }),
        None => None,
    };

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        status: parse_enum::<TaskStatus>(&status, 4)?,
        priority: parse_enum::<Priority>(&priority, 5)?,
        due_date: parse_date(row.get(6)?)?,
        completed_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        project: row.get(10)?,
        sprint: row.get(11)?,
        assigned_to,
    })
}

pub(crate) fn get_task_internal(conn: &Connection, task_id: TaskId) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("{TASK_SELECT} WHERE t.id = ?1"),
            params![task_id],
            parse_task_row,
        )
        .optional()?;
    Ok(task)
}

/// Column values for a task insert or full update.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<ProfileId>,
    pub project: Option<ProjectId>,
    pub sprint: Option<SprintId>,
}

impl TaskRow {
    /// Current column values of a loaded task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            assigned_to: task.assignee_id(),
            project: task.project,
            sprint: task.sprint,
        }
    }
}

impl Database {
    pub fn insert_task(&self, row: &TaskRow) -> Result<Task> {
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    title, description, completed, status, priority, due_date,
                    created_at, updated_at, assigned_to, project_id, sprint_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    row.title,
                    row.description,
                    row.completed,
                    row.status.as_str(),
                    row.priority.as_str(),
                    row.due_date.map(|d| d.to_string()),
                    now,
                    now,
                    row.assigned_to,
                    row.project,
                    row.sprint,
                ],
            )?;

            let id = conn.last_insert_rowid();
            get_task_internal(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("task {} vanished after insert", id))
        })
    }

    /// Unscoped point lookup.
    pub fn get_task(&self, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Full update of every mutable column. Leaves `completed_at` alone.
    pub fn save_task(&self, task_id: TaskId, row: &TaskRow) -> Result<Option<Task>> {
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET
                    title = ?1, description = ?2, completed = ?3, status = ?4, priority = ?5,
                    due_date = ?6, assigned_to = ?7, project_id = ?8, sprint_id = ?9,
                    updated_at = ?10
                 WHERE id = ?11",
                params![
                    row.title,
                    row.description,
                    row.completed,
                    row.status.as_str(),
                    row.priority.as_str(),
                    row.due_date.map(|d| d.to_string()),
                    row.assigned_to,
                    row.project,
                    row.sprint,
                    now,
                    task_id,
                ],
            )?;
            get_task_internal(conn, task_id)
        })
    }

    /// Targeted write of the completion fields only.
    ///
    /// Sets `completed = 1`, `completed_at = at` and bumps `updated_at`, and
    /// only while `completed_at` is still NULL. Returns whether a row changed.
    pub fn mark_task_completed(&self, task_id: TaskId, at: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = 1, completed_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND completed_at IS NULL",
                params![at, task_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Point the task at a profile. Any existing profile id is accepted.
    pub fn set_task_assignee(&self, task_id: TaskId, profile_id: Option<ProfileId>) -> Result<Option<Task>> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET assigned_to = ?1, updated_at = ?2 WHERE id = ?3",
                params![profile_id, now, task_id],
            )?;
            get_task_internal(conn, task_id)
        })
    }

    pub fn delete_task(&self, task_id: TaskId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(deleted > 0)
        })
    }

    /// Number of tasks currently placed in a sprint.
    pub fn count_sprint_tasks(&self, sprint_id: SprintId) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE sprint_id = ?1",
                params![sprint_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
