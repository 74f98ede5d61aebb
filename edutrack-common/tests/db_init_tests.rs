//! Tests for database initialization and schema guarantees
//!
//! The storage layer owns the two invariants the services rely on:
//! - UNIQUE (task_id, student_id) on task_assignments
//! - ON DELETE CASCADE from tasks to assignments/submissions/notifications

use edutrack_common::db::{create_schema, init_database};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}

async fn seed_user(pool: &SqlitePool, id: &str, name: &str, role: &str) {
    sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(format!("{}@example.com", id))
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_task(pool: &SqlitePool, id: &str, created_by: &str) {
    sqlx::query(
        "INSERT INTO tasks (id, title, due_date, created_by) VALUES (?, 'Essay', '2026-09-01T00:00:00Z', ?)",
    )
    .bind(id)
    .bind(created_by)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let test_db = format!("/tmp/edutrack-test-db-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    // Ensure database doesn't exist
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    // Cleanup
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let test_db = format!("/tmp/edutrack-test-db-existing-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Opening a second time (schema creation is idempotent) must succeed
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_all_tables_exist() {
    let pool = memory_pool().await;

    for table in ["users", "tasks", "task_assignments", "submissions", "notifications"] {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1, "table {} missing", table);
    }
}

#[tokio::test]
async fn test_duplicate_assignment_rejected_by_unique_index() {
    let pool = memory_pool().await;
    seed_user(&pool, "exp-1", "Prof", "expert").await;
    seed_user(&pool, "stu-1", "Alice", "student").await;
    seed_task(&pool, "task-1", "exp-1").await;

    sqlx::query("INSERT INTO task_assignments (id, task_id, student_id) VALUES ('a-1', 'task-1', 'stu-1')")
        .execute(&pool)
        .await
        .unwrap();

    // Second insert of the same (task, student) pair must hit the index
    let err = sqlx::query("INSERT INTO task_assignments (id, task_id, student_id) VALUES ('a-2', 'task-1', 'stu-1')")
        .execute(&pool)
        .await
        .unwrap_err();

    assert!(edutrack_common::error::is_unique_violation(&err));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_assignments WHERE task_id = 'task-1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1, "no duplicate row may be created");
}

#[tokio::test]
async fn test_task_delete_cascades() {
    let pool = memory_pool().await;
    seed_user(&pool, "exp-1", "Prof", "expert").await;
    seed_user(&pool, "stu-1", "Alice", "student").await;
    seed_task(&pool, "task-1", "exp-1").await;

    sqlx::query("INSERT INTO task_assignments (id, task_id, student_id) VALUES ('a-1', 'task-1', 'stu-1')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO submissions (id, task_id, student_id, answer, status) VALUES ('s-1', 'task-1', 'stu-1', 'x', 'submitted')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO notifications (id, user_id, task_id, expert_id, title, message) \
         VALUES ('n-1', 'stu-1', 'task-1', 'exp-1', 'New Task Assigned', 'm')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM tasks WHERE id = 'task-1'")
        .execute(&pool)
        .await
        .unwrap();

    for table in ["task_assignments", "submissions", "notifications"] {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE task_id = 'task-1'", table))
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0, "{} rows must cascade with the task", table);
    }
}
