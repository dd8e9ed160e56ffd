//! Per-project task counts and progress.

use super::Engine;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{ProjectId, ProjectStats, User};

/// Completed share of `total` as a whole percentage. Halves round to even.
pub fn progress_percent(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round_ties_even() as i64
}

impl Engine {
    /// Aggregate counts for one visible project.
    pub fn project_stats(&self, user: &User, project: Option<ProjectId>) -> ServiceResult<ProjectStats> {
        let project_id = project.ok_or_else(|| ServiceError::missing_param("project"))?;
        let project = self.get_project(user, project_id)?;
        let counts = self.db.project_task_counts(project.id)?;

        Ok(ProjectStats {
            total: counts.total,
            completed: counts.completed,
            in_progress: counts.in_progress,
            progress: progress_percent(counts.completed, counts.total),
            team_members: self.stats.team_members,
        })
    }
}
