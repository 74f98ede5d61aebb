//! Database access layer for edutrack
//!
//! Owns schema creation and connection initialization. The
//! (task_id, student_id) uniqueness constraint on task_assignments is the
//! one hard coordination guarantee in the system; it lives here, in the
//! storage layer, and application code never pre-checks it.

pub mod models;

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection SQLite setting; configuring them
    // on the connect options covers every pooled connection.
    // WAL allows concurrent readers with one writer.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent - safe to call multiple times)
///
/// Public so tests can run the full schema against `sqlite::memory:`.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Redundant for pools built by init_database; single-connection
    // in-memory test pools rely on it.
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_users_table(pool).await?;
    create_tasks_table(pool).await?;
    create_submissions_table(pool).await?;
    create_task_assignments_table(pool).await?;
    create_notifications_table(pool).await?;

    Ok(())
}

/// Create the users table
///
/// Materialized User directory: the auth/profile services own user
/// lifecycle; this core only reads id/name/email/role/avatar.
async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'student'
                CHECK (role IN ('student', 'expert')),
            avatar TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the tasks table
///
/// The assignee set is immutable after creation; it is materialized as
/// task_assignments rows, one per resolved student.
async fn create_tasks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            due_date TIMESTAMP NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('low', 'medium', 'high')),
            attachments TEXT NOT NULL DEFAULT '[]',
            created_by TEXT NOT NULL REFERENCES users(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tasks_created_by ON tasks(created_by, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the submissions table
async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            student_id TEXT NOT NULL REFERENCES users(id),
            answer TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'submitted', 'reviewed')),
            marks INTEGER,
            feedback TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (task_id, student_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the task_assignments table
///
/// UNIQUE (task_id, student_id) rejects duplicate assignment of the same
/// pair; concurrent duplicate attempts fail here rather than being
/// merged or overwritten.
async fn create_task_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_assignments (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            student_id TEXT NOT NULL REFERENCES users(id),
            status TEXT NOT NULL DEFAULT 'Pending'
                CHECK (status IN ('Pending', 'In Progress', 'Completed')),
            submitted_at TIMESTAMP,
            completed_at TIMESTAMP,
            score INTEGER,
            feedback TEXT,
            submission_id TEXT REFERENCES submissions(id) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (task_id, student_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assignments_student ON task_assignments(student_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assignments_task ON task_assignments(task_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the notifications table
async fn create_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            expert_id TEXT NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'task_assigned'
                CHECK (kind IN ('task_assigned', 'task_due_soon', 'task_overdue', 'feedback_received')),
            read INTEGER NOT NULL DEFAULT 0,
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('low', 'medium', 'high')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_notifications_user_read ON notifications(user_id, read)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_notifications_user_created ON notifications(user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
