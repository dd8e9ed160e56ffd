//! Sprint operations.

use super::Engine;
use crate::db::sprints::SprintRow;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{NewSprint, Sprint, SprintId, SprintPatch, User};
use chrono::NaiveDate;
use tracing::info;

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ServiceResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ServiceError::invalid_value(
                "end_date",
                format!("end_date {} is before start_date {}", end, start),
            ));
        }
    }
    Ok(())
}

impl Engine {
    pub fn create_sprint(&self, user: &User, input: NewSprint) -> ServiceResult<Sprint> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::missing_field("name"));
        }
        let project = self.referenced_project(user, input.project, "project")?;
        check_dates(input.start_date, input.end_date)?;

        let sprint = self.db.insert_sprint(SprintRow {
            name: name.to_string(),
            goal: input.goal.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            start_date: input.start_date,
            end_date: input.end_date,
            project: project.id,
        })?;
        info!(sprint_id = sprint.id, project_id = project.id, "Created sprint");
        Ok(sprint)
    }

    pub fn list_sprints(&self, user: &User) -> ServiceResult<Vec<Sprint>> {
        Ok(self.db.visible_sprints(Self::scope(user))?)
    }

    pub fn get_sprint(&self, user: &User, sprint_id: SprintId) -> ServiceResult<Sprint> {
        self.db
            .visible_sprint(Self::scope(user), sprint_id)?
            .ok_or_else(|| ServiceError::not_found("Sprint", sprint_id))
    }

    /// Partial update. Moving a sprint is limited to the acting user's own
    /// projects and refused while tasks still reference it.
    pub fn update_sprint(
        &self,
        user: &User,
        sprint_id: SprintId,
        patch: SprintPatch,
    ) -> ServiceResult<Sprint> {
        let mut sprint = self.get_sprint(user, sprint_id)?;
        self.require_write(user, &sprint)?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::missing_field("name"));
            }
            sprint.name = name.to_string();
        }
        if let Some(goal) = patch.goal {
            sprint.goal = goal;
        }
        if let Some(status) = patch.status {
            sprint.status = status;
        }
        if let Some(start_date) = patch.start_date {
            sprint.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            sprint.end_date = end_date;
        }
        check_dates(sprint.start_date, sprint.end_date)?;

        if let Some(project_id) = patch.project.filter(|p| *p != sprint.project) {
            let project = self.referenced_project(user, Some(project_id), "project")?;
            let attached = self.db.count_sprint_tasks(sprint.id)?;
            if attached > 0 {
                return Err(ServiceError::invalid_value(
                    "project",
                    format!("sprint still has {} task(s) in its current project", attached),
                ));
            }
            sprint.project = project.id;
        }

        self.db.save_sprint(&sprint)?;
        info!(sprint_id, project_id = sprint.project, "Updated sprint");
        Ok(sprint)
    }

    /// Delete a sprint. Its tasks stay in the project with no sprint.
    pub fn delete_sprint(&self, user: &User, sprint_id: SprintId) -> ServiceResult<()> {
        let sprint = self.get_sprint(user, sprint_id)?;
        self.require_write(user, &sprint)?;

        if !self.db.delete_sprint(sprint.id)? {
            return Err(ServiceError::not_found("Sprint", sprint_id));
        }
        info!(sprint_id, "Deleted sprint");
        Ok(())
    }
}
