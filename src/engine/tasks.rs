//! Task operations and the completion transition.

use super::Engine;
use crate::analytics::TaskCompleted;
use crate::db::now_ms;
use crate::db::scope::TaskFilter;
use crate::db::tasks::TaskRow;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{
    NewTask, ProfileId, Project, ProjectId, SprintId, Task, TaskId, TaskPatch, TaskStatus, User,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Body of `POST /api/tasks/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub user_profile_id: Option<ProfileId>,
}

/// Resolve the `(status, completed)` pair to store.
///
/// A supplied `status` wins and `completed` follows it. A lone
/// `completed: true` means done; a lone `completed: false` reopens a done
/// task to `todo` and leaves any other status alone. With neither supplied
/// the current state is kept, normalized so both columns agree.
pub fn reconcile_completion(
    current_status: TaskStatus,
    currently_done: bool,
    status: Option<TaskStatus>,
    completed: Option<bool>,
) -> (TaskStatus, bool) {
    match (status, completed) {
        (Some(status), _) => (status, status.is_done()),
        (None, Some(true)) => (TaskStatus::Done, true),
        (None, Some(false)) if currently_done => (TaskStatus::Todo, false),
        (None, Some(false)) => (current_status, false),
        (None, None) if currently_done => (TaskStatus::Done, true),
        (None, None) => (current_status, false),
    }
}

fn required_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::missing_field("title"));
    }
    Ok(title.to_string())
}

impl Engine {
    /// The project a task write points at, plus the sprint inside it.
    ///
    /// The project must be owned by the acting user and the sprint must
    /// belong to that project.
    fn check_task_refs(
        &self,
        user: &User,
        project: Option<ProjectId>,
        sprint: Option<SprintId>,
    ) -> ServiceResult<Project> {
        let project = self.referenced_project(user, project, "project")?;

        if let Some(sprint_id) = sprint {
            let sprint = self.db.get_sprint(sprint_id)?.ok_or_else(|| {
                ServiceError::invalid_value(
                    "sprint",
                    format!("Invalid pk \"{}\" - object does not exist.", sprint_id),
                )
            })?;
            if sprint.project != project.id {
                return Err(ServiceError::permission_denied(
                    "Sprint does not belong to the selected project",
                )
                .with_field("sprint"));
            }
        }

        Ok(project)
    }

    fn check_assignee(&self, assignee: Option<ProfileId>) -> ServiceResult<()> {
        if let Some(profile_id) = assignee {
            if self.db.get_profile(profile_id)?.is_none() {
                return Err(ServiceError::invalid_value(
                    "assigned_to",
                    format!("Invalid pk \"{}\" - object does not exist.", profile_id),
                ));
            }
        }
        Ok(())
    }

    /// Side effects of a task entering `done`.
    ///
    /// `completed_at` is stamped only while unset, and the completion event
    /// is emitted only by the write that stamps it. Reopening and finishing
    /// a task again therefore neither moves the timestamp nor records a
    /// second event. A recorder failure is logged and dropped.
    fn on_task_completed(&self, user: &User, task: Task) -> ServiceResult<Task> {
        if task.completed_at.is_some() || !self.db.mark_task_completed(task.id, now_ms())? {
            debug!(task_id = task.id, "Task already has a completion time");
            return Ok(task);
        }
        let task = self
            .db
            .get_task(task.id)?
            .ok_or_else(|| ServiceError::task_not_found(task.id))?;

        let event = TaskCompleted {
            task_id: task.id,
            title: task.title.clone(),
            project_id: task.project,
        };
        match self.recorder.record_task_completed(user.id, &event) {
            Ok(record) => debug!(task_id = task.id, record_id = record.id, "Recorded task completion"),
            Err(e) => warn!(task_id = task.id, user_id = user.id, error = %e, "Failed to record task completion"),
        }

        Ok(task)
    }

    pub fn create_task(&self, user: &User, input: NewTask) -> ServiceResult<Task> {
        let title = required_title(&input.title)?;
        let project = self.check_task_refs(user, input.project, input.sprint)?;
        self.check_assignee(input.assigned_to)?;

        let (status, completed) =
            reconcile_completion(TaskStatus::default(), false, input.status, input.completed);

        let task = self.db.insert_task(&TaskRow {
            title,
            description: input.description.unwrap_or_default(),
            completed,
            status,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            assigned_to: input.assigned_to,
            project: Some(project.id),
            sprint: input.sprint,
        })?;
        info!(task_id = task.id, project_id = project.id, "Created task");

        if task.is_done() {
            return self.on_task_completed(user, task);
        }
        Ok(task)
    }

    pub fn list_tasks(&self, user: &User, filter: &TaskFilter) -> ServiceResult<Vec<Task>> {
        Ok(self.db.visible_tasks(Self::scope(user), filter)?)
    }

    pub fn get_task(&self, user: &User, task_id: TaskId) -> ServiceResult<Task> {
        self.db
            .visible_task(Self::scope(user), task_id)?
            .ok_or_else(|| ServiceError::task_not_found(task_id))
    }

    /// Partial update with completion edge detection.
    ///
    /// Completion side effects run only when the task goes from not-done to
    /// done. Leaving `done` keeps `completed_at`.
    pub fn update_task(&self, user: &User, task_id: TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        let previous = self.get_task(user, task_id)?;
        self.require_write(user, &previous)?;

        let mut row = TaskRow::from_task(&previous);
        if let Some(title) = patch.title {
            row.title = required_title(&title)?;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(priority) = patch.priority {
            row.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            row.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.check_assignee(assigned_to)?;
            row.assigned_to = assigned_to;
        }
        if let Some(project) = patch.project {
            row.project = Some(project);
        }
        if let Some(sprint) = patch.sprint {
            row.sprint = sprint;
        }
        self.check_task_refs(user, row.project, row.sprint)?;

        let (status, completed) =
            reconcile_completion(previous.status, previous.is_done(), patch.status, patch.completed);
        row.status = status;
        row.completed = completed;

        let updated = self
            .db
            .save_task(task_id, &row)?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;

        if updated.is_done() && !previous.is_done() {
            info!(task_id, "Task completed");
            return self.on_task_completed(user, updated);
        }
        Ok(updated)
    }

    pub fn delete_task(&self, user: &User, task_id: TaskId) -> ServiceResult<()> {
        let task = self.get_task(user, task_id)?;
        self.require_write(user, &task)?;

        if !self.db.delete_task(task.id)? {
            return Err(ServiceError::task_not_found(task_id));
        }
        info!(task_id, "Deleted task");
        Ok(())
    }

    /// Set a visible task's assignee to an existing profile.
    pub fn assign_task(&self, user: &User, request: AssignRequest) -> ServiceResult<Task> {
        let task_id = request
            .task_id
            .ok_or_else(|| ServiceError::missing_field("task_id"))?;
        let profile_id = request
            .user_profile_id
            .ok_or_else(|| ServiceError::missing_field("user_profile_id"))?;

        let task = self.get_task(user, task_id)?;
        let profile = self
            .db
            .get_profile(profile_id)?
            .ok_or_else(|| ServiceError::profile_not_found(profile_id))?;
        self.require_write(user, &task)?;

        let task = self
            .db
            .set_task_assignee(task.id, Some(profile.id))?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;
        info!(task_id, profile_id, "Assigned task");
        Ok(task)
    }
}
