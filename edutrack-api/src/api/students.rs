//! Student directory endpoint for assignee selection

use axum::{extract::State, Extension, Json};

use crate::api::{Actor, ApiError};
use crate::services::directory::{StudentEntry, UserDirectory};
use crate::AppState;

/// GET /api/students
///
/// All students, ordered by name, for the expert's assignee picker.
pub async fn list_students(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<StudentEntry>>, ApiError> {
    actor.require_expert()?;

    let directory = UserDirectory::new(state.db.clone());
    let students = directory.list_students().await?;

    Ok(Json(students))
}
