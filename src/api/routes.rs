//! REST handlers. Each one resolves the acting user and delegates to [`Engine`].
//!
//! [`Engine`]: crate::engine::Engine

use super::AppState;
use super::auth::ActingUser;
use crate::db::scope::TaskFilter;
use crate::engine::AssignRequest;
use crate::error::ServiceResult;
use crate::types::{
    AnalyticsRecord, NewProject, NewSprint, NewTask, Project, ProjectId, ProjectPatch,
    ProjectStats, ProfileId, ProfilePatch, Sprint, SprintId, SprintPatch, Task, TaskId, TaskPatch, UserProfile,
    deserialize_blank_as_none,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

type JsonBody<T> = Result<Json<T>, JsonRejection>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub(super) async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// Projects

pub(super) async fn list_projects(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ServiceResult<Json<Vec<Project>>> {
    Ok(Json(state.engine.list_projects(&user)?))
}

pub(super) async fn create_project(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    body: JsonBody<NewProject>,
) -> ServiceResult<(StatusCode, Json<Project>)> {
    let Json(input) = body?;
    let project = state.engine.create_project(&user, input)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub(super) async fn get_project(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(project_id): Path<ProjectId>,
) -> ServiceResult<Json<Project>> {
    Ok(Json(state.engine.get_project(&user, project_id)?))
}

pub(super) async fn update_project(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(project_id): Path<ProjectId>,
    body: JsonBody<ProjectPatch>,
) -> ServiceResult<Json<Project>> {
    let Json(patch) = body?;
    Ok(Json(state.engine.update_project(&user, project_id, patch)?))
}

pub(super) async fn delete_project(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(project_id): Path<ProjectId>,
) -> ServiceResult<StatusCode> {
    state.engine.delete_project(&user, project_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Sprints

pub(super) async fn list_sprints(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ServiceResult<Json<Vec<Sprint>>> {
    Ok(Json(state.engine.list_sprints(&user)?))
}

pub(super) async fn create_sprint(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    body: JsonBody<NewSprint>,
) -> ServiceResult<(StatusCode, Json<Sprint>)> {
    let Json(input) = body?;
    let sprint = state.engine.create_sprint(&user, input)?;
    Ok((StatusCode::CREATED, Json(sprint)))
}

pub(super) async fn get_sprint(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(sprint_id): Path<SprintId>,
) -> ServiceResult<Json<Sprint>> {
    Ok(Json(state.engine.get_sprint(&user, sprint_id)?))
}

pub(super) async fn update_sprint(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(sprint_id): Path<SprintId>,
    body: JsonBody<SprintPatch>,
) -> ServiceResult<Json<Sprint>> {
    let Json(patch) = body?;
    Ok(Json(state.engine.update_sprint(&user, sprint_id, patch)?))
}

pub(super) async fn delete_sprint(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(sprint_id): Path<SprintId>,
) -> ServiceResult<StatusCode> {
    state.engine.delete_sprint(&user, sprint_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Tasks

pub(super) async fn list_tasks(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> ServiceResult<Json<Vec<Task>>> {
    let Query(filter) = query?;
    Ok(Json(state.engine.list_tasks(&user, &filter)?))
}

pub(super) async fn create_task(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    body: JsonBody<NewTask>,
) -> ServiceResult<(StatusCode, Json<Task>)> {
    let Json(input) = body?;
    let task = state.engine.create_task(&user, input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn get_task(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(task_id): Path<TaskId>,
) -> ServiceResult<Json<Task>> {
    Ok(Json(state.engine.get_task(&user, task_id)?))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(task_id): Path<TaskId>,
    body: JsonBody<TaskPatch>,
) -> ServiceResult<Json<Task>> {
    let Json(patch) = body?;
    Ok(Json(state.engine.update_task(&user, task_id, patch)?))
}

pub(super) async fn delete_task(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(task_id): Path<TaskId>,
) -> ServiceResult<StatusCode> {
    state.engine.delete_task(&user, task_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn assign_task(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    body: JsonBody<AssignRequest>,
) -> ServiceResult<Json<Task>> {
    let Json(request) = body?;
    Ok(Json(state.engine.assign_task(&user, request)?))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct StatsQuery {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    project: Option<ProjectId>,
}

pub(super) async fn project_stats(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ServiceResult<Json<ProjectStats>> {
    let Query(params) = query?;
    Ok(Json(state.engine.project_stats(&user, params.project)?))
}

// Users and analytics

pub(super) async fn list_profiles(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ServiceResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.engine.list_profiles(&user)?))
}

pub(super) async fn get_profile(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(profile_id): Path<ProfileId>,
) -> ServiceResult<Json<UserProfile>> {
    Ok(Json(state.engine.get_profile(&user, profile_id)?))
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Path(profile_id): Path<ProfileId>,
    body: JsonBody<ProfilePatch>,
) -> ServiceResult<Json<UserProfile>> {
    let Json(patch) = body?;
    Ok(Json(state.engine.update_profile(&user, profile_id, patch)?))
}

pub(super) async fn list_analytics(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> ServiceResult<Json<Vec<AnalyticsRecord>>> {
    Ok(Json(state.engine.list_analytics(&user)?))
}
