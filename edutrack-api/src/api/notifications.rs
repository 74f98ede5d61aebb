//! Notification endpoints, all scoped to the calling user

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use edutrack_common::db::models::Notification;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{Actor, ApiError};
use crate::services::notify::{NotificationFanout, NotificationView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

fn fanout(state: &AppState) -> NotificationFanout {
    NotificationFanout::new(state.db.clone(), state.events.clone())
}

/// GET /api/notifications?unread_only=true
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let notifications = fanout(&state)
        .list_for_user(&actor.user_id, query.unread_only)
        .await?;

    Ok(Json(notifications))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Notification>, ApiError> {
    let notification = fanout(&state).mark_read(&id, &actor.user_id).await?;

    Ok(Json(notification))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let updated = fanout(&state).mark_all_read(&actor.user_id).await?;

    Ok(Json(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let count = fanout(&state).unread_count(&actor.user_id).await?;

    Ok(Json(json!({ "count": count })))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    fanout(&state).delete(&id, &actor.user_id).await?;

    Ok(Json(json!({ "message": "Notification deleted successfully" })))
}
