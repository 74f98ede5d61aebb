//! Assignment endpoints: student status transitions and expert grading

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use edutrack_common::db::models::{AssignmentStatus, TaskAssignment};
use edutrack_common::Error;
use serde::Deserialize;

use crate::api::{Actor, ApiError};
use crate::services::assignment_ledger::{AssignmentLedger, StudentAssignmentView, SubmissionPayload};
use crate::services::grading::GradingService;
use crate::AppState;

/// PATCH /api/tasks/:task_id/status request body
#[derive(Debug, Deserialize)]
pub struct StatusUpdatePayload {
    pub status: String,
    pub submission: Option<SubmissionData>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionData {
    pub answer: String,
}

/// PATCH /api/assignments/:assignment_id/grade request body
#[derive(Debug, Deserialize)]
pub struct GradePayload {
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

/// PATCH /api/tasks/:task_id/status
///
/// Move the calling student's assignment through the lifecycle.
/// Completing requires a submission answer.
pub async fn update_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<Json<TaskAssignment>, ApiError> {
    let target = AssignmentStatus::parse(&payload.status)?;
    let submission = payload
        .submission
        .map(|s| SubmissionPayload { answer: s.answer });

    let ledger = AssignmentLedger::new(state.db.clone());
    let assignment = ledger
        .transition(&task_id, &actor.user_id, target, submission)
        .await?;

    Ok(Json(assignment))
}

/// GET /api/student/tasks
///
/// The calling student's assignments with nested task and creator.
pub async fn student_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<StudentAssignmentView>>, ApiError> {
    let ledger = AssignmentLedger::new(state.db.clone());
    let assignments = ledger.list_by_student(&actor.user_id).await?;

    Ok(Json(assignments))
}

/// PATCH /api/assignments/:assignment_id/grade
///
/// Record score and feedback; also marks a linked submission reviewed.
pub async fn update_grade(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<GradePayload>,
) -> Result<Json<TaskAssignment>, ApiError> {
    actor.require_expert()?;

    let score = payload
        .score
        .ok_or_else(|| Error::Validation("Score is required".to_string()))?;

    let grading = GradingService::new(state.db.clone());
    let assignment = grading
        .set_grade(
            &assignment_id,
            &actor.user_id,
            score,
            payload.feedback.as_deref(),
        )
        .await?;

    Ok(Json(assignment))
}
