//! Core types for the Taskflow backend.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type ProfileId = i64;
pub type ProjectId = i64;
pub type SprintId = i64;
pub type TaskId = i64;

/// Deserialize a present field as `Some`, so `Option<Option<T>>` can tell
/// "absent" (outer `None`) apart from an explicit `null` (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Parse an optional query-string value, treating an empty value as absent.
pub fn deserialize_blank_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: fmt::Display,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Identity principal. Opaque to the core beyond being an ownership key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_staff: bool,
    pub date_joined: i64,
}

/// Profile attached 1:1 to a user; the assignable identity for tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub username: String,
    pub bio: String,
    pub avatar: Option<String>,
}

/// Task workflow status. `Done` is mirrored by the legacy `completed` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Progress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Progress => "progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "progress" => Ok(TaskStatus::Progress),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Highest,
    High,
    #[default]
    Medium,
    Low,
    Lowest,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Highest => "highest",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Lowest => "lowest",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(Priority::Highest),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            "lowest" => Ok(Priority::Lowest),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    #[default]
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintStatus::Planned => "planned",
            SprintStatus::Active => "active",
            SprintStatus::Completed => "completed",
        }
    }
}

impl FromStr for SprintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(SprintStatus::Planned),
            "active" => Ok(SprintStatus::Active),
            "completed" => Ok(SprintStatus::Completed),
            other => Err(format!("unknown sprint status: {}", other)),
        }
    }
}

/// A project, owned directly by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub color: String,
    pub owner: UserId,
    pub created_at: i64,
}

/// A sprint. Its owner is its project's owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    pub goal: String,
    pub status: SprintStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project: ProjectId,
    pub created_at: i64,
}

/// A task. `assigned_to` is resolved to the nested profile on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Legacy mirror of `status == done`.
    pub completed: bool,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub assigned_to: Option<UserProfile>,
    pub project: Option<ProjectId>,
    pub sprint: Option<SprintId>,
}

impl Task {
    /// Done by either the current status or the legacy flag.
    pub fn is_done(&self) -> bool {
        self.status.is_done() || self.completed
    }

    pub fn assignee_id(&self) -> Option<ProfileId> {
        self.assigned_to.as_ref().map(|p| p.id)
    }
}

/// Append-only analytics event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsRecord {
    pub id: i64,
    pub user: ProfileId,
    pub action: String,
    pub timestamp: i64,
    pub details: Option<serde_json::Value>,
}

/// Per-project task aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    /// Percentage of completed tasks, rounded; 0 for an empty project.
    pub progress: i64,
    pub team_members: i64,
}

// =============================================================================
// Write payloads
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Free-form profile fields. `avatar: null` clears the avatar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSprint {
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub status: Option<SprintStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub project: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SprintPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub status: Option<SprintStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub project: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Bare profile id on write.
    #[serde(default)]
    pub assigned_to: Option<ProfileId>,
    #[serde(default)]
    pub project: Option<ProjectId>,
    #[serde(default)]
    pub sprint: Option<SprintId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<ProfileId>>,
    #[serde(default)]
    pub project: Option<ProjectId>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sprint: Option<Option<SprintId>>,
}
