//! Assignment ledger
//!
//! One row per (task, student) pair, created in bulk at task-creation
//! time. Owns the status lifecycle:
//!
//! Pending -> In Progress -> Completed, with two guarded reversals:
//! In Progress -> Pending (revert) and Completed -> In Progress
//! (reopen, clears completed_at; the submission row survives).
//! Completing from any state requires a submission payload and upserts
//! the linked submission.

use chrono::{DateTime, Utc};
use edutrack_common::db::models::{
    AssignmentStatus, Attachment, Priority, SubmissionStatus, TaskAssignment,
};
use edutrack_common::error::{is_foreign_key_violation, is_unique_violation};
use edutrack_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::directory::StudentEntry;
use super::progress::ProgressRow;
use super::submission_store::SubmissionStore;

/// Transition guard for the assignment state machine
///
/// `to == Completed` is always allowed (Completed -> Completed is a
/// resubmission). Everything else must be one of the three explicit
/// edges; same-state writes and Completed -> Pending are rejected.
pub fn can_transition(from: AssignmentStatus, to: AssignmentStatus) -> bool {
    use AssignmentStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress) | (InProgress, Pending) | (Completed, InProgress) | (_, Completed)
    )
}

/// Answer text accompanying a transition to Completed
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub answer: String,
}

/// Outcome of a bulk fan-out insert
///
/// Duplicates are rejected by the storage layer's unique index and
/// reported per id, so retrying against a partially-created set is
/// idempotent and never silently merged.
#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateReport {
    pub created: Vec<String>,
    pub already_assigned: Vec<String>,
}

/// Expert reference embedded in student-facing task views
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CreatorRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Task projection nested under a student's assignment
#[derive(Debug, Clone, Serialize)]
pub struct AssignedTaskView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub attachments: Vec<Attachment>,
    pub created_by: CreatorRef,
}

/// A student's own assignment with its task and creator
#[derive(Debug, Clone, Serialize)]
pub struct StudentAssignmentView {
    pub id: String,
    pub status: AssignmentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub submission_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub task: AssignedTaskView,
}

/// Submission projection nested under a roster entry
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: String,
    pub answer: Option<String>,
    pub status: SubmissionStatus,
    pub marks: Option<i64>,
    pub feedback: Option<String>,
}

/// Expert-facing roster entry: assignment with student and submission
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub id: String,
    pub task_id: String,
    pub status: AssignmentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub student: StudentEntry,
    pub submission: Option<SubmissionView>,
}

#[derive(sqlx::FromRow)]
struct StudentTaskRow {
    id: String,
    task_id: String,
    status: AssignmentStatus,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    score: Option<i64>,
    feedback: Option<String>,
    submission_id: Option<String>,
    created_at: DateTime<Utc>,
    task_title: String,
    task_description: Option<String>,
    due_date: DateTime<Utc>,
    priority: Priority,
    task_attachments: sqlx::types::Json<Vec<Attachment>>,
    expert_id: String,
    expert_name: String,
    expert_email: String,
}

#[derive(sqlx::FromRow)]
struct RosterRow {
    id: String,
    task_id: String,
    status: AssignmentStatus,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    score: Option<i64>,
    feedback: Option<String>,
    created_at: DateTime<Utc>,
    student_id: String,
    student_name: String,
    student_email: String,
    student_avatar: Option<String>,
    sub_id: Option<String>,
    sub_answer: Option<String>,
    sub_status: Option<SubmissionStatus>,
    sub_marks: Option<i64>,
    sub_feedback: Option<String>,
}

pub struct AssignmentLedger {
    db: SqlitePool,
}

impl AssignmentLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert one Pending assignment row
    ///
    /// A duplicate (task, student) pair surfaces as Conflict from the
    /// unique index; an unknown task or student id surfaces as a
    /// validation error from the foreign keys.
    pub async fn insert_assignment(&self, task_id: &str, student_id: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO task_assignments (id, task_id, student_id, status) \
             VALUES (?, ?, ?, 'Pending')",
        )
        .bind(&id)
        .bind(task_id)
        .bind(student_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!(
                    "Student {} is already assigned to task {}",
                    student_id, task_id
                ))
            } else if is_foreign_key_violation(&e) {
                Error::Validation(format!("Unknown task or student id: {}", student_id))
            } else {
                e.into()
            }
        })?;

        Ok(id)
    }

    /// Create one Pending row per student id, reporting per-id outcomes
    pub async fn bulk_create(
        &self,
        task_id: &str,
        student_ids: &[String],
    ) -> Result<BulkCreateReport> {
        let mut report = BulkCreateReport {
            created: Vec::new(),
            already_assigned: Vec::new(),
        };

        for student_id in student_ids {
            match self.insert_assignment(task_id, student_id).await {
                Ok(_) => report.created.push(student_id.clone()),
                Err(Error::Conflict(_)) => report.already_assigned.push(student_id.clone()),
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            task_id,
            created = report.created.len(),
            already_assigned = report.already_assigned.len(),
            "Created assignment rows"
        );

        Ok(report)
    }

    /// Fetch an assignment by id
    pub async fn get(&self, id: &str) -> Result<Option<TaskAssignment>> {
        let assignment =
            sqlx::query_as::<_, TaskAssignment>("SELECT * FROM task_assignments WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(assignment)
    }

    /// Fetch the assignment row for (task, student)
    pub async fn find_for_student(
        &self,
        task_id: &str,
        student_id: &str,
    ) -> Result<Option<TaskAssignment>> {
        let assignment = sqlx::query_as::<_, TaskAssignment>(
            "SELECT * FROM task_assignments WHERE task_id = ? AND student_id = ?",
        )
        .bind(task_id)
        .bind(student_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(assignment)
    }

    /// Apply a status transition for one student on one task
    ///
    /// Completing requires a submission payload: the submission row is
    /// upserted and linked, and submitted_at/completed_at are stamped,
    /// all in one transaction. Reverting clears completed_at.
    pub async fn transition(
        &self,
        task_id: &str,
        student_id: &str,
        target: AssignmentStatus,
        submission: Option<SubmissionPayload>,
    ) -> Result<TaskAssignment> {
        let current = self
            .find_for_student(task_id, student_id)
            .await?
            .ok_or_else(|| Error::NotFound("Task assignment not found".to_string()))?;

        if !can_transition(current.status, target) {
            return Err(Error::Validation(format!(
                "Cannot move assignment from {} to {}",
                current.status.as_str(),
                target.as_str()
            )));
        }

        let now = Utc::now();

        match target {
            AssignmentStatus::Completed => {
                let answer = submission
                    .map(|s| s.answer)
                    .filter(|a| !a.trim().is_empty())
                    .ok_or_else(|| {
                        Error::Validation(
                            "A submission answer is required to complete a task".to_string(),
                        )
                    })?;

                let store = SubmissionStore::new(self.db.clone());
                let mut tx = self.db.begin().await?;

                let submission_id = store
                    .upsert_submitted(&mut tx, task_id, student_id, &answer)
                    .await?;

                sqlx::query(
                    "UPDATE task_assignments \
                     SET status = 'Completed', submission_id = ?, submitted_at = ?, \
                         completed_at = ?, updated_at = ? \
                     WHERE id = ?",
                )
                .bind(&submission_id)
                .bind(now)
                .bind(now)
                .bind(now)
                .bind(&current.id)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
            }
            AssignmentStatus::InProgress | AssignmentStatus::Pending => {
                // Reverting out of Completed (or back to Pending) always
                // clears completed_at; submitted_at and the submission
                // row are kept for a later resubmission.
                sqlx::query(
                    "UPDATE task_assignments \
                     SET status = ?, completed_at = NULL, updated_at = ? \
                     WHERE id = ?",
                )
                .bind(target)
                .bind(now)
                .bind(&current.id)
                .execute(&self.db)
                .await?;
            }
        }

        tracing::info!(
            assignment_id = %current.id,
            task_id,
            student_id,
            from = current.status.as_str(),
            to = target.as_str(),
            "Assignment status updated"
        );

        self.get(&current.id).await?.ok_or_else(|| {
            Error::Internal(format!("Assignment {} vanished during update", current.id))
        })
    }

    /// A student's assignments with nested task and creator, newest-first
    pub async fn list_by_student(&self, student_id: &str) -> Result<Vec<StudentAssignmentView>> {
        let rows = sqlx::query_as::<_, StudentTaskRow>(
            "SELECT a.id, a.task_id, a.status, a.submitted_at, a.completed_at, a.score, \
                    a.feedback, a.submission_id, a.created_at, \
                    t.title AS task_title, t.description AS task_description, t.due_date, \
                    t.priority, t.attachments AS task_attachments, \
                    u.id AS expert_id, u.name AS expert_name, u.email AS expert_email \
             FROM task_assignments a \
             JOIN tasks t ON a.task_id = t.id \
             JOIN users u ON t.created_by = u.id \
             WHERE a.student_id = ? \
             ORDER BY a.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StudentAssignmentView {
                id: row.id,
                status: row.status,
                submitted_at: row.submitted_at,
                completed_at: row.completed_at,
                score: row.score,
                feedback: row.feedback,
                submission_id: row.submission_id,
                created_at: row.created_at,
                task: AssignedTaskView {
                    id: row.task_id,
                    title: row.task_title,
                    description: row.task_description,
                    due_date: row.due_date,
                    priority: row.priority,
                    attachments: row.task_attachments.0,
                    created_by: CreatorRef {
                        id: row.expert_id,
                        name: row.expert_name,
                        email: row.expert_email,
                    },
                },
            })
            .collect())
    }

    /// Full roster for a task with student and submission data, newest-first
    pub async fn list_by_task(&self, task_id: &str) -> Result<Vec<RosterEntry>> {
        let rows = sqlx::query_as::<_, RosterRow>(
            "SELECT a.id, a.task_id, a.status, a.submitted_at, a.completed_at, a.score, \
                    a.feedback, a.created_at, \
                    u.id AS student_id, u.name AS student_name, u.email AS student_email, \
                    u.avatar AS student_avatar, \
                    s.id AS sub_id, s.answer AS sub_answer, s.status AS sub_status, \
                    s.marks AS sub_marks, s.feedback AS sub_feedback \
             FROM task_assignments a \
             JOIN users u ON a.student_id = u.id \
             LEFT JOIN submissions s ON a.submission_id = s.id \
             WHERE a.task_id = ? \
             ORDER BY a.created_at DESC",
        )
        .bind(task_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RosterEntry {
                id: row.id,
                task_id: row.task_id,
                status: row.status,
                submitted_at: row.submitted_at,
                completed_at: row.completed_at,
                score: row.score,
                feedback: row.feedback,
                created_at: row.created_at,
                student: StudentEntry {
                    id: row.student_id,
                    name: row.student_name,
                    email: row.student_email,
                    avatar: row.student_avatar,
                },
                submission: match (row.sub_id, row.sub_status) {
                    (Some(id), Some(status)) => Some(SubmissionView {
                        id,
                        answer: row.sub_answer,
                        status,
                        marks: row.sub_marks,
                        feedback: row.sub_feedback,
                    }),
                    _ => None,
                },
            })
            .collect())
    }

    /// Status/completed_at projection for the aggregator
    pub async fn progress_rows(&self, task_id: &str) -> Result<Vec<ProgressRow>> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            "SELECT status, completed_at FROM task_assignments WHERE task_id = ?",
        )
        .bind(task_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssignmentStatus::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(can_transition(Pending, InProgress));
        assert!(can_transition(InProgress, Completed));
        assert!(can_transition(Pending, Completed));
    }

    #[test]
    fn guarded_reversals_are_allowed() {
        assert!(can_transition(InProgress, Pending));
        assert!(can_transition(Completed, InProgress));
    }

    #[test]
    fn resubmission_is_allowed() {
        assert!(can_transition(Completed, Completed));
    }

    #[test]
    fn everything_else_is_rejected() {
        assert!(!can_transition(Pending, Pending));
        assert!(!can_transition(InProgress, InProgress));
        assert!(!can_transition(Completed, Pending));
    }
}
