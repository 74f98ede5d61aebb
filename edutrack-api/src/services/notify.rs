//! Notification fan-out and maintenance
//!
//! Fan-out runs after the task/assignment writes have committed and is
//! invoked fire-and-forget: the caller logs and swallows any error here,
//! so a failed fan-out never unwinds a created task. Maintenance
//! operations are all scoped to the requesting user, including delete.

use chrono::{DateTime, Utc};
use edutrack_common::db::models::{Notification, NotificationKind, Priority};
use edutrack_common::events::{EventBus, TaskEvent};
use edutrack_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

/// Cap on notification list reads
const LIST_LIMIT: i64 = 50;

/// Notification with its task and sender context, for list views
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NotificationView {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub task_title: Option<String>,
    pub task_due_date: Option<DateTime<Utc>>,
    pub expert_name: Option<String>,
}

pub struct NotificationFanout {
    db: SqlitePool,
    events: EventBus,
}

impl NotificationFanout {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Write one task_assigned notification per student, then emit a
    /// TaskAssigned event
    ///
    /// Returns without writing when the expert row is missing; database
    /// errors propagate to the caller, which swallows them.
    pub async fn dispatch(
        &self,
        student_ids: &[String],
        task_id: &str,
        expert_id: &str,
        task_title: &str,
    ) -> Result<()> {
        let expert_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?")
                .bind(expert_id)
                .fetch_optional(&self.db)
                .await?;

        let Some(expert_name) = expert_name else {
            warn!(expert_id, task_id, "Skipping fan-out: expert not found");
            return Ok(());
        };

        let message = format!("{} assigned you a new task: {}", expert_name, task_title);

        let mut tx = self.db.begin().await?;
        for student_id in student_ids {
            sqlx::query(
                "INSERT INTO notifications \
                 (id, user_id, task_id, expert_id, title, message, kind, priority) \
                 VALUES (?, ?, ?, ?, 'New Task Assigned', ?, 'task_assigned', 'high')",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(student_id)
            .bind(task_id)
            .bind(expert_id)
            .bind(&message)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(task_id, recipients = student_ids.len(), "Dispatched task notifications");

        // Advisory event; nobody listening is not an error
        let _ = self.events.emit(TaskEvent::TaskAssigned {
            task_id: task_id.to_string(),
            expert_id: expert_id.to_string(),
            student_ids: student_ids.to_vec(),
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// A user's notifications, newest-first, capped at 50
    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<NotificationView>> {
        let mut sql = String::from(
            "SELECT n.id, n.task_id, n.title, n.message, n.kind, n.read, n.priority, \
                    n.created_at, \
                    t.title AS task_title, t.due_date AS task_due_date, \
                    u.name AS expert_name \
             FROM notifications n \
             LEFT JOIN tasks t ON n.task_id = t.id \
             LEFT JOIN users u ON n.expert_id = u.id \
             WHERE n.user_id = ?",
        );
        if unread_only {
            sql.push_str(" AND n.read = 0");
        }
        sql.push_str(" ORDER BY n.created_at DESC LIMIT ?");

        let notifications = sqlx::query_as::<_, NotificationView>(&sql)
            .bind(user_id)
            .bind(LIST_LIMIT)
            .fetch_all(&self.db)
            .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<Notification> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Notification not found".to_string()));
        }

        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(notification)
    }

    /// Mark all of the user's unread notifications read
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
                .bind(user_id)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected())
    }

    /// Count of the user's unread notifications
    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Delete one of the user's notifications
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}
