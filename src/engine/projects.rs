//! Project operations. The owner is always the acting user.

use super::Engine;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{NewProject, Project, ProjectId, ProjectPatch, User};
use tracing::info;

fn required_name(name: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::missing_field("name"));
    }
    Ok(name.to_string())
}

impl Engine {
    /// Create a project owned by the acting user. The payload never sets the owner.
    pub fn create_project(&self, user: &User, input: NewProject) -> ServiceResult<Project> {
        let name = required_name(&input.name)?;
        let project = self
            .db
            .insert_project(user.id, &name, input.color.as_deref())?;
        info!(project_id = project.id, owner = user.id, "Created project");
        Ok(project)
    }

    pub fn list_projects(&self, user: &User) -> ServiceResult<Vec<Project>> {
        Ok(self.db.visible_projects(Self::scope(user))?)
    }

    pub fn get_project(&self, user: &User, project_id: ProjectId) -> ServiceResult<Project> {
        self.db
            .visible_project(Self::scope(user), project_id)?
            .ok_or_else(|| ServiceError::not_found("Project", project_id))
    }

    pub fn update_project(
        &self,
        user: &User,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> ServiceResult<Project> {
        let mut project = self.get_project(user, project_id)?;
        self.require_write(user, &project)?;

        if let Some(name) = patch.name {
            project.name = required_name(&name)?;
        }
        if let Some(color) = patch.color {
            project.color = color;
        }

        self.db.save_project(&project)?;
        info!(project_id, "Updated project");
        Ok(project)
    }

    /// Delete a project together with its sprints and tasks.
    pub fn delete_project(&self, user: &User, project_id: ProjectId) -> ServiceResult<()> {
        let project = self.get_project(user, project_id)?;
        self.require_write(user, &project)?;

        if !self.db.delete_project(project.id)? {
            return Err(ServiceError::not_found("Project", project_id));
        }
        info!(project_id, "Deleted project");
        Ok(())
    }
}
