//! Analytics recorder.
//!
//! Emission is best-effort: callers log and drop a [`RecordError`]; it never
//! reaches the result of the operation that triggered it.

use crate::db::Database;
use crate::types::{AnalyticsRecord, ProfileId, ProjectId, TaskId, UserId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

pub const ACTION_TASK_COMPLETED: &str = "task_completed";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no profile for user {0}")]
    MissingProfile(UserId),
    #[error("analytics storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

/// One completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompleted {
    pub task_id: TaskId,
    pub title: String,
    pub project_id: Option<ProjectId>,
}

/// Sink for analytics events.
pub trait AnalyticsRecorder: Send + Sync {
    /// Append one event attributed to `user`'s profile.
    fn record_task_completed(
        &self,
        user: UserId,
        event: &TaskCompleted,
    ) -> Result<AnalyticsRecord, RecordError>;
}

/// Recorder that appends rows to the `analytics_records` table.
#[derive(Clone)]
pub struct DbAnalyticsRecorder {
    db: Arc<Database>,
}

impl DbAnalyticsRecorder {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn profile_id(&self, user: UserId) -> Result<ProfileId, RecordError> {
        self.db
            .profile_for_user(user)?
            .map(|p| p.id)
            .ok_or(RecordError::MissingProfile(user))
    }
}

impl AnalyticsRecorder for DbAnalyticsRecorder {
    fn record_task_completed(
        &self,
        user: UserId,
        event: &TaskCompleted,
    ) -> Result<AnalyticsRecord, RecordError> {
        let profile_id = self.profile_id(user)?;
        let details = json!({
            "task_id": event.task_id,
            "title": event.title,
            "project_id": event.project_id,
        });
        let record = self
            .db
            .insert_analytics_record(profile_id, ACTION_TASK_COMPLETED, Some(&details))?;
        Ok(record)
    }
}
