//! Task catalog
//!
//! Owns task creation (with assignee resolution and per-student
//! fan-out), the expert's list/detail reads, and deletion. The assignee
//! set is fixed at creation time; deletion cascades through the schema's
//! foreign keys.

use chrono::{DateTime, Utc};
use edutrack_common::db::models::{Attachment, Priority, Task};
use edutrack_common::events::EventBus;
use edutrack_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use super::assignment_ledger::{AssignmentLedger, CreatorRef, RosterEntry};
use super::directory::{AssigneeSpec, StudentEntry, UserDirectory};
use super::notify::NotificationFanout;
use super::progress::{self, LeaderboardEntry, LeaderboardRow, ProgressRow, TaskAnalytics, TaskProgress};

/// Leaderboard cap for the dashboard read
const LEADERBOARD_LIMIT: usize = 10;

/// Unvalidated task fields from the create request
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Create response: the task plus its resolved assignees
#[derive(Debug, Serialize)]
pub struct CreatedTask {
    pub task: Task,
    pub assigned_to: Vec<StudentEntry>,
}

/// List entry: task annotated with live progress counts
#[derive(Debug, Serialize)]
pub struct TaskWithProgress {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_to: Vec<StudentEntry>,
    pub progress: TaskProgress,
}

/// Task with its creator and assignee projections
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub creator: CreatorRef,
    pub assigned_to: Vec<StudentEntry>,
}

/// Detail view: task, roster, and recomputed analytics
#[derive(Debug, Serialize)]
pub struct TaskDetails {
    pub task: TaskView,
    pub assignments: Vec<RosterEntry>,
    pub analytics: TaskAnalytics,
}

pub struct TaskCatalog {
    db: SqlitePool,
    events: EventBus,
}

impl TaskCatalog {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    fn ledger(&self) -> AssignmentLedger {
        AssignmentLedger::new(self.db.clone())
    }

    fn directory(&self) -> UserDirectory {
        UserDirectory::new(self.db.clone())
    }

    /// Create a task, fan out assignment rows, and dispatch notifications
    ///
    /// Notification failure is logged and swallowed; the committed task
    /// and assignment rows stand regardless.
    pub async fn create(
        &self,
        draft: TaskDraft,
        assignees: &AssigneeSpec,
        expert_id: &str,
    ) -> Result<CreatedTask> {
        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Validation("Title and due date are required".to_string()))?;
        let due_date = draft
            .due_date
            .ok_or_else(|| Error::Validation("Title and due date are required".to_string()))?;
        let priority = match draft.priority.as_deref() {
            Some(p) => Priority::parse(p)?,
            None => Priority::Medium,
        };

        if assignees.is_empty() {
            return Err(Error::Validation("No students provided".to_string()));
        }
        let student_ids = self.directory().resolve(assignees).await?;

        let task_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO tasks (id, title, description, due_date, priority, attachments, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task_id)
        .bind(&title)
        .bind(&draft.description)
        .bind(due_date)
        .bind(priority)
        .bind(sqlx::types::Json(&draft.attachments))
        .bind(expert_id)
        .execute(&self.db)
        .await?;

        self.ledger().bulk_create(&task_id, &student_ids).await?;

        // Fire-and-forget: the task and its assignment rows are already
        // committed and must survive a fan-out failure.
        let fanout = NotificationFanout::new(self.db.clone(), self.events.clone());
        if let Err(e) = fanout
            .dispatch(&student_ids, &task_id, expert_id, &title)
            .await
        {
            warn!(task_id, error = %e, "Notification fan-out failed");
        }

        let task = self.fetch_task(&task_id).await?.ok_or_else(|| {
            Error::Internal(format!("Task {} vanished after creation", task_id))
        })?;
        let assigned_to = self.assigned_students(&task_id).await?;

        tracing::info!(task_id, expert_id, assignees = assigned_to.len(), "Task created");

        Ok(CreatedTask { task, assigned_to })
    }

    /// The expert's tasks, newest-first, annotated with progress counts
    pub async fn list(&self, expert_id: &str) -> Result<Vec<TaskWithProgress>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE created_by = ? ORDER BY created_at DESC",
        )
        .bind(expert_id)
        .fetch_all(&self.db)
        .await?;

        let ledger = self.ledger();
        let mut result = Vec::with_capacity(tasks.len());
        for task in tasks {
            let rows = ledger.progress_rows(&task.id).await?;
            let assigned_to = self.assigned_students(&task.id).await?;
            result.push(TaskWithProgress {
                progress: progress::per_task(&rows),
                assigned_to,
                task,
            });
        }

        Ok(result)
    }

    /// Task detail with roster and analytics, ownership-checked
    pub async fn get_details(&self, task_id: &str, expert_id: &str) -> Result<TaskDetails> {
        let task = self
            .fetch_task(task_id)
            .await?
            .filter(|t| t.created_by == expert_id)
            .ok_or_else(|| Error::NotFound("Task not found".to_string()))?;

        let assignments = self.ledger().list_by_task(task_id).await?;

        // Analytics from the same rows the roster shows
        let rows: Vec<ProgressRow> = assignments
            .iter()
            .map(|a| ProgressRow {
                status: a.status,
                completed_at: a.completed_at,
            })
            .collect();
        let analytics = progress::per_task_detailed(task.created_at, &rows);

        let creator = sqlx::query_as::<_, CreatorRef>(
            "SELECT id, name, email FROM users WHERE id = ?",
        )
        .bind(&task.created_by)
        .fetch_one(&self.db)
        .await?;

        let assigned_to = self.assigned_students(task_id).await?;

        Ok(TaskDetails {
            task: TaskView {
                task,
                creator,
                assigned_to,
            },
            assignments,
            analytics,
        })
    }

    /// Roster read used by the expert-facing assignments endpoint
    pub async fn roster(&self, task_id: &str, expert_id: &str) -> Result<Vec<RosterEntry>> {
        self.fetch_task(task_id)
            .await?
            .filter(|t| t.created_by == expert_id)
            .ok_or_else(|| Error::NotFound("Task not found".to_string()))?;

        self.ledger().list_by_task(task_id).await
    }

    /// Delete an owned task; the schema cascades assignments,
    /// submissions, and notifications
    pub async fn delete(&self, task_id: &str, expert_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND created_by = ?")
            .bind(task_id)
            .bind(expert_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Task not found".to_string()));
        }

        tracing::info!(task_id, expert_id, "Task deleted");
        Ok(())
    }

    /// Top students by completion rate across the expert's tasks
    pub async fn leaderboard(&self, expert_id: &str) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT a.student_id, u.name AS student_name, a.status \
             FROM task_assignments a \
             JOIN tasks t ON a.task_id = t.id \
             JOIN users u ON a.student_id = u.id \
             WHERE t.created_by = ?",
        )
        .bind(expert_id)
        .fetch_all(&self.db)
        .await?;

        let mut board = progress::leaderboard(&rows);
        board.truncate(LEADERBOARD_LIMIT);
        Ok(board)
    }

    async fn fetch_task(&self, task_id: &str) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(task)
    }

    async fn assigned_students(&self, task_id: &str) -> Result<Vec<StudentEntry>> {
        let students = sqlx::query_as::<_, StudentEntry>(
            "SELECT u.id, u.name, u.email, u.avatar \
             FROM task_assignments a \
             JOIN users u ON a.student_id = u.id \
             WHERE a.task_id = ? \
             ORDER BY u.name ASC",
        )
        .bind(task_id)
        .fetch_all(&self.db)
        .await?;

        Ok(students)
    }
}
