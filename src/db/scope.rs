//! Owner-scoped queries.
//!
//! A [`Scope`] carries the acting user. Every query here joins through the
//! live `project` reference to `projects.owner_id`, so rows with a broken
//! owner chain (a task whose project is NULL) never match.

use super::Database;
use super::projects::parse_project_row;
use super::sprints::{SPRINT_COLUMNS, parse_sprint_row};
use super::tasks::{TASK_SELECT, parse_task_row};
use crate::types::{
    Project, ProjectId, Sprint, SprintId, Task, TaskId, User, UserId, deserialize_blank_as_none,
};
use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use serde::Deserialize;

/// Visibility scope of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    owner: UserId,
}

impl Scope {
    pub fn new(owner: UserId) -> Self {
        Self { owner }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id)
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }
}

/// Optional exact-match filters for task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFilter {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project: Option<ProjectId>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub sprint: Option<SprintId>,
}

impl TaskFilter {
    /// Build the WHERE clause and its parameters. `?1` is always the owner.
    fn where_clause(&self, owner: UserId) -> (String, Vec<i64>) {
        let mut clause = String::from(" WHERE pr.owner_id = ?1");
        let mut values = vec![owner];

        if let Some(project) = self.project {
            values.push(project);
            clause.push_str(&format!(" AND t.project_id = ?{}", values.len()));
        }
        if let Some(sprint) = self.sprint {
            values.push(sprint);
            clause.push_str(&format!(" AND t.sprint_id = ?{}", values.len()));
        }

        (clause, values)
    }
}

impl Database {
    /// Projects owned by the scope's user, newest first.
    pub fn visible_projects(&self, scope: Scope) -> Result<Vec<Project>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM projects WHERE owner_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let projects = stmt
                .query_map(params![scope.owner()], parse_project_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(projects)
        })
    }

    pub fn visible_project(&self, scope: Scope, project_id: ProjectId) -> Result<Option<Project>> {
        self.with_conn(|conn| {
            let project = conn
                .query_row(
                    "SELECT * FROM projects WHERE id = ?1 AND owner_id = ?2",
                    params![project_id, scope.owner()],
                    parse_project_row,
                )
                .optional()?;
            Ok(project)
        })
    }

    /// Sprints whose project is owned by the scope's user, newest first.
    pub fn visible_sprints(&self, scope: Scope) -> Result<Vec<Sprint>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SPRINT_COLUMNS} FROM sprints s
                 JOIN projects pr ON pr.id = s.project_id
                 WHERE pr.owner_id = ?1
                 ORDER BY s.created_at DESC, s.id DESC"
            ))?;
            let sprints = stmt
                .query_map(params![scope.owner()], parse_sprint_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sprints)
        })
    }

    pub fn visible_sprint(&self, scope: Scope, sprint_id: SprintId) -> Result<Option<Sprint>> {
        self.with_conn(|conn| {
            let sprint = conn
                .query_row(
                    &format!(
                        "SELECT {SPRINT_COLUMNS} FROM sprints s
                         JOIN projects pr ON pr.id = s.project_id
                         WHERE s.id = ?1 AND pr.owner_id = ?2"
                    ),
                    params![sprint_id, scope.owner()],
                    parse_sprint_row,
                )
                .optional()?;
            Ok(sprint)
        })
    }

    /// Tasks whose project is owned by the scope's user, in insertion order.
    pub fn visible_tasks(&self, scope: Scope, filter: &TaskFilter) -> Result<Vec<Task>> {
        let (clause, values) = filter.where_clause(scope.owner());

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{TASK_SELECT}
                 JOIN projects pr ON pr.id = t.project_id
                 {clause}
                 ORDER BY t.id"
            ))?;
            let tasks = stmt
                .query_map(rusqlite::params_from_iter(values.iter()), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    pub fn visible_task(&self, scope: Scope, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!(
                        "{TASK_SELECT}
                         JOIN projects pr ON pr.id = t.project_id
                         WHERE t.id = ?1 AND pr.owner_id = ?2"
                    ),
                    params![task_id, scope.owner()],
                    parse_task_row,
                )
                .optional()?;
            Ok(task)
        })
    }
}
