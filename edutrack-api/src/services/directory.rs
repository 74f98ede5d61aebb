//! User directory lookups
//!
//! The directory itself (signup, profile, avatars) is owned by an
//! external service; this core only resolves assignee specs and reads
//! display projections.

use edutrack_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// How a caller names the assignees of a new task
///
/// An explicit tagged choice: `{"ids": [..]}` or `{"names": [..]}` in
/// request payloads. Never inferred from array contents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeSpec {
    Ids(Vec<String>),
    Names(Vec<String>),
}

impl AssigneeSpec {
    pub fn is_empty(&self) -> bool {
        match self {
            AssigneeSpec::Ids(ids) => ids.is_empty(),
            AssigneeSpec::Names(names) => names.is_empty(),
        }
    }
}

/// Directory projection used by student pickers and rosters
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Resolve an assignee spec into a concrete student id set
    ///
    /// Ids are validated for shape and passed through; existence is
    /// enforced later by the storage layer's foreign keys. Names are
    /// matched against directory entries with the student role and fail
    /// with NotFound when nothing matches.
    pub async fn resolve(&self, spec: &AssigneeSpec) -> Result<Vec<String>> {
        match spec {
            AssigneeSpec::Ids(ids) => {
                for id in ids {
                    Uuid::parse_str(id)
                        .map_err(|_| Error::Validation(format!("Invalid student id: {}", id)))?;
                }
                Ok(ids.clone())
            }
            AssigneeSpec::Names(names) => {
                if names.is_empty() {
                    return Err(Error::Validation("No students provided".to_string()));
                }

                let placeholders = vec!["?"; names.len()].join(", ");
                let sql = format!(
                    "SELECT id FROM users WHERE role = 'student' AND name IN ({})",
                    placeholders
                );

                let mut query = sqlx::query_scalar::<_, String>(&sql);
                for name in names {
                    query = query.bind(name);
                }

                let ids = query.fetch_all(&self.db).await?;
                if ids.is_empty() {
                    return Err(Error::NotFound("No matching students found".to_string()));
                }
                Ok(ids)
            }
        }
    }

    /// All students, for assignee selection, ordered by name
    pub async fn list_students(&self) -> Result<Vec<StudentEntry>> {
        let students = sqlx::query_as::<_, StudentEntry>(
            "SELECT id, name, email, avatar FROM users WHERE role = 'student' ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(students)
    }

    /// Display name of a user, if the row exists
    pub async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(name)
    }
}
