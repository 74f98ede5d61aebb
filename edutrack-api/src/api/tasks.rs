//! Expert-facing task endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use edutrack_common::db::models::Attachment;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{Actor, ApiError};
use crate::services::assignment_ledger::RosterEntry;
use crate::services::directory::AssigneeSpec;
use crate::services::progress::LeaderboardEntry;
use crate::services::task_catalog::{
    CreatedTask, TaskCatalog, TaskDetails, TaskDraft, TaskWithProgress,
};
use crate::AppState;

/// POST /api/tasks request body
#[derive(Debug, Deserialize)]
pub struct AssignTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub assignees: AssigneeSpec,
}

/// POST /api/tasks
///
/// Create a task, resolve its assignees, fan out assignment rows and
/// notifications.
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<AssignTaskPayload>,
) -> Result<(StatusCode, Json<CreatedTask>), ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    let draft = TaskDraft {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date,
        priority: payload.priority,
        attachments: payload.attachments,
    };

    let created = catalog
        .create(draft, &payload.assignees, &actor.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/tasks
///
/// All tasks created by the calling expert, with progress summaries.
pub async fn list_expert_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<TaskWithProgress>>, ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    let tasks = catalog.list(&actor.user_id).await?;

    Ok(Json(tasks))
}

/// GET /api/tasks/:task_id
///
/// Task detail with the full roster and recomputed analytics.
pub async fn task_details(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<TaskDetails>, ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    let details = catalog.get_details(&task_id, &actor.user_id).await?;

    Ok(Json(details))
}

/// GET /api/tasks/:task_id/assignments
///
/// Expert-facing roster for one task.
pub async fn task_roster(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    let roster = catalog.roster(&task_id, &actor.user_id).await?;

    Ok(Json(roster))
}

/// DELETE /api/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    catalog.delete(&task_id, &actor.user_id).await?;

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// GET /api/analytics/leaderboard
///
/// Top students by completion rate across the calling expert's tasks.
pub async fn leaderboard(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    actor.require_expert()?;

    let catalog = TaskCatalog::new(state.db.clone(), state.events.clone());
    let board = catalog.leaderboard(&actor.user_id).await?;

    Ok(Json(board))
}
