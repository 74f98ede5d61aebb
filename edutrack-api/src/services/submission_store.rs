//! Submission persistence
//!
//! A submission exists once per (task, student) and is written inside
//! the caller's transaction: the ledger upserts it on completion, the
//! grading service marks it reviewed.

use chrono::Utc;
use edutrack_common::db::models::Submission;
use edutrack_common::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

pub struct SubmissionStore {
    db: SqlitePool,
}

impl SubmissionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create or update the submission for (task, student), marking it submitted
    ///
    /// Returns the submission id for linking on the assignment row.
    pub async fn upsert_submitted(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        task_id: &str,
        student_id: &str,
        answer: &str,
    ) -> Result<String> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM submissions WHERE task_id = ? AND student_id = ?")
                .bind(task_id)
                .bind(student_id)
                .fetch_optional(&mut **tx)
                .await?;

        if let Some((id,)) = existing {
            sqlx::query(
                "UPDATE submissions SET answer = ?, status = 'submitted', updated_at = ? WHERE id = ?",
            )
            .bind(answer)
            .bind(Utc::now())
            .bind(&id)
            .execute(&mut **tx)
            .await?;

            tracing::debug!(submission_id = %id, task_id, student_id, "Updated existing submission");
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO submissions (id, task_id, student_id, answer, status) \
             VALUES (?, ?, ?, ?, 'submitted')",
        )
        .bind(&id)
        .bind(task_id)
        .bind(student_id)
        .bind(answer)
        .execute(&mut **tx)
        .await?;

        tracing::debug!(submission_id = %id, task_id, student_id, "Created submission");
        Ok(id)
    }

    /// Record the expert's review on a linked submission
    pub async fn mark_reviewed(
        tx: &mut Transaction<'_, Sqlite>,
        submission_id: &str,
        marks: i64,
        feedback: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE submissions SET marks = ?, feedback = ?, status = 'reviewed', updated_at = ? \
             WHERE id = ?",
        )
        .bind(marks)
        .bind(feedback)
        .bind(Utc::now())
        .bind(submission_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Fetch a submission by id
    pub async fn get(&self, id: &str) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(submission)
    }
}
