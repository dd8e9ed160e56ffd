//! Owner-scoped operations on projects, sprints and tasks.
//!
//! Reads go through [`Scope`]d lookups, so anything the acting user does not
//! own is reported as not found. Writes additionally pass the object-level
//! [`authorize`] check. Task updates detect the transition into `done` and
//! stamp `completed_at` and emit an analytics event exactly on that edge.

mod projects;
mod sprints;
mod stats;
mod tasks;

pub use stats::progress_percent;
pub use tasks::{AssignRequest, reconcile_completion};

use crate::analytics::AnalyticsRecorder;
use crate::config::StatsConfig;
use crate::db::Database;
use crate::db::scope::Scope;
use crate::error::{ServiceError, ServiceResult};
use crate::ownership::OwnershipResolvable;
use crate::policy::{Operation, authorize};
use crate::types::{AnalyticsRecord, ProfileId, ProfilePatch, Project, ProjectId, User, UserProfile};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for every owner-scoped operation.
#[derive(Clone)]
pub struct Engine {
    db: Arc<Database>,
    recorder: Arc<dyn AnalyticsRecorder>,
    stats: StatsConfig,
}

impl Engine {
    pub fn new(db: Arc<Database>, recorder: Arc<dyn AnalyticsRecorder>, stats: StatsConfig) -> Self {
        Self {
            db,
            recorder,
            stats,
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Object-level write check, after the scoped lookup already succeeded.
    fn require_write(&self, user: &User, object: &dyn OwnershipResolvable) -> ServiceResult<()> {
        if authorize(self.db.as_ref(), user.id, object, Operation::Write)? {
            Ok(())
        } else {
            debug!(user_id = user.id, "Object-level write denied");
            Err(ServiceError::permission_denied(
                "You do not have permission to perform this action",
            ))
        }
    }

    /// Resolve a project referenced by a write payload.
    ///
    /// An unknown id is a validation error on `field`; a project owned by
    /// someone else is a permission error.
    fn referenced_project(
        &self,
        user: &User,
        project_id: Option<ProjectId>,
        field: &str,
    ) -> ServiceResult<Project> {
        let project_id = project_id.ok_or_else(|| ServiceError::missing_field(field))?;
        let project = self.db.get_project(project_id)?.ok_or_else(|| {
            ServiceError::invalid_value(field, format!("Invalid pk \"{}\" - object does not exist.", project_id))
        })?;

        if authorize(self.db.as_ref(), user.id, &project, Operation::Write)? {
            Ok(project)
        } else {
            Err(ServiceError::permission_denied("Project does not belong to you").with_field(field))
        }
    }

    /// Analytics records attributed to the acting user's profile.
    pub fn list_analytics(&self, user: &User) -> ServiceResult<Vec<AnalyticsRecord>> {
        match self.db.profile_for_user(user.id)? {
            Some(profile) => Ok(self.db.analytics_for_profile(profile.id)?),
            None => Ok(Vec::new()),
        }
    }

    /// Profiles the acting user may see.
    pub fn list_profiles(&self, user: &User) -> ServiceResult<Vec<UserProfile>> {
        Ok(self.db.visible_profiles(user)?)
    }

    pub fn get_profile(&self, user: &User, profile_id: ProfileId) -> ServiceResult<UserProfile> {
        self.db
            .visible_profiles(user)?
            .into_iter()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| ServiceError::profile_not_found(profile_id))
    }

    /// Update a profile the acting user can see: their own, or any for staff.
    pub fn update_profile(
        &self,
        user: &User,
        profile_id: ProfileId,
        patch: ProfilePatch,
    ) -> ServiceResult<UserProfile> {
        let profile = self.get_profile(user, profile_id)?;

        let updated = self
            .db
            .update_profile(
                profile.id,
                patch.bio.as_deref(),
                patch.avatar.as_ref().map(|a| a.as_deref()),
            )?
            .ok_or_else(|| ServiceError::profile_not_found(profile_id))?;
        info!(profile_id, user_id = user.id, "Updated profile");
        Ok(updated)
    }

    fn scope(user: &User) -> Scope {
        Scope::for_user(user)
    }
}
