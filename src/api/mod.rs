//! HTTP API.
//!
//! JSON over axum. Every route except `/api/health` requires a token and acts
//! as the token's user.

mod auth;
mod error;
mod routes;

pub use auth::ActingUser;

use crate::engine::Engine;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/projects",
            get(routes::list_projects).post(routes::create_project),
        )
        .route(
            "/api/projects/{project_id}",
            get(routes::get_project)
                .put(routes::update_project)
                .patch(routes::update_project)
                .delete(routes::delete_project),
        )
        .route(
            "/api/sprints",
            get(routes::list_sprints).post(routes::create_sprint),
        )
        .route(
            "/api/sprints/{sprint_id}",
            get(routes::get_sprint)
                .put(routes::update_sprint)
                .patch(routes::update_sprint)
                .delete(routes::delete_sprint),
        )
        .route("/api/tasks", get(routes::list_tasks).post(routes::create_task))
        .route("/api/tasks/assign", post(routes::assign_task))
        .route("/api/tasks/stats", get(routes::project_stats))
        .route(
            "/api/tasks/{task_id}",
            get(routes::get_task)
                .put(routes::update_task)
                .patch(routes::update_task)
                .delete(routes::delete_task),
        )
        .route("/api/users", get(routes::list_profiles))
        .route(
            "/api/users/{profile_id}",
            get(routes::get_profile)
                .put(routes::update_profile)
                .patch(routes::update_profile),
        )
        .route("/api/analytics", get(routes::list_analytics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve in the background.
///
/// Returns a oneshot sender that stops the server gracefully, and the
/// address actually bound.
pub async fn start_server(
    engine: Engine,
    addr: &str,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let app = build_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("API server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}
