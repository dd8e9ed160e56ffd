//! Aggregation queries for project statistics.

use super::Database;
use crate::types::ProjectId;
use anyhow::Result;
use rusqlite::params;

/// Raw task counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
}

impl Database {
    /// Count a project's tasks by status bucket.
    pub fn project_task_counts(&self, project_id: ProjectId) -> Result<TaskCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status IN ('progress', 'review') THEN 1 ELSE 0 END), 0)
                 FROM tasks WHERE project_id = ?1",
                params![project_id],
                |row| {
                    Ok(TaskCounts {
                        total: row.get(0)?,
                        completed: row.get(1)?,
                        in_progress: row.get(2)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }
}
