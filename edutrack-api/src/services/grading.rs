//! Grading
//!
//! The assignment update and the linked submission's review update are
//! one logical unit and run in a single transaction: a reader never sees
//! a graded assignment whose submission is still unreviewed.

use chrono::Utc;
use edutrack_common::db::models::TaskAssignment;
use edutrack_common::{Error, Result};
use sqlx::SqlitePool;

use super::submission_store::SubmissionStore;

pub struct GradingService {
    db: SqlitePool,
}

impl GradingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record the expert's score and feedback on an assignment
    ///
    /// Fails Forbidden unless the expert created the parent task, and
    /// Validation unless the score is within 0..=100. Both checks run
    /// before any write.
    pub async fn set_grade(
        &self,
        assignment_id: &str,
        expert_id: &str,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<TaskAssignment> {
        let row: Option<(Option<String>, String)> = sqlx::query_as(
            "SELECT a.submission_id, t.created_by \
             FROM task_assignments a \
             JOIN tasks t ON a.task_id = t.id \
             WHERE a.id = ?",
        )
        .bind(assignment_id)
        .fetch_optional(&self.db)
        .await?;

        let Some((submission_id, created_by)) = row else {
            return Err(Error::NotFound("Assignment not found".to_string()));
        };

        if created_by != expert_id {
            return Err(Error::Forbidden(
                "Only the task creator can grade this assignment".to_string(),
            ));
        }

        if !(0..=100).contains(&score) {
            return Err(Error::Validation(
                "Score must be between 0 and 100".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE task_assignments SET score = ?, feedback = ?, updated_at = ? WHERE id = ?")
            .bind(score)
            .bind(feedback)
            .bind(Utc::now())
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;

        if let Some(submission_id) = &submission_id {
            SubmissionStore::mark_reviewed(&mut tx, submission_id, score, feedback).await?;
        }

        tx.commit().await?;

        tracing::info!(
            assignment_id,
            expert_id,
            score,
            reviewed_submission = submission_id.is_some(),
            "Grade recorded"
        );

        let assignment =
            sqlx::query_as::<_, TaskAssignment>("SELECT * FROM task_assignments WHERE id = ?")
                .bind(assignment_id)
                .fetch_one(&self.db)
                .await?;

        Ok(assignment)
    }
}
