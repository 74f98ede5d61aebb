//! edutrack-api library - Task assignment service
//!
//! Experts create tasks fanned out to students; students move their
//! assignment through the Pending / In Progress / Completed lifecycle;
//! experts grade completed work. Progress analytics are recomputed on
//! every read and never persisted.

use axum::Router;
use edutrack_common::events::EventBus;
use sqlx::SqlitePool;

pub mod api;
pub mod services;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Broadcast bus for after-commit task events
    pub events: EventBus,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }
}

/// Build application router
///
/// All /api routes sit behind the actor-context middleware; /health is
/// public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, patch, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    // Protected routes (require an authenticated actor)
    let protected = Router::new()
        .route(
            "/api/tasks",
            post(api::tasks::assign_task).get(api::tasks::list_expert_tasks),
        )
        .route(
            "/api/tasks/:task_id",
            get(api::tasks::task_details).delete(api::tasks::delete_task),
        )
        .route("/api/tasks/:task_id/assignments", get(api::tasks::task_roster))
        .route("/api/tasks/:task_id/status", patch(api::assignments::update_status))
        .route("/api/student/tasks", get(api::assignments::student_tasks))
        .route(
            "/api/assignments/:assignment_id/grade",
            patch(api::assignments::update_grade),
        )
        .route("/api/students", get(api::students::list_students))
        .route("/api/analytics/leaderboard", get(api::tasks::leaderboard))
        .route("/api/notifications", get(api::notifications::list_notifications))
        .route("/api/notifications/unread-count", get(api::notifications::unread_count))
        .route("/api/notifications/read-all", patch(api::notifications::mark_all_read))
        .route("/api/notifications/:id/read", patch(api::notifications::mark_read))
        .route("/api/notifications/:id", delete(api::notifications::delete_notification))
        .layer(middleware::from_fn(api::auth::actor_context));

    // Public routes (no authentication)
    let public = api::health::health_routes();

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
