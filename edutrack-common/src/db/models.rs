//! Database models
//!
//! Status values are stored exactly as they appear on the wire
//! ("In Progress" with a space, lowercase submission states), so rows
//! and API payloads stay interchangeable.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directory role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Expert,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "student" => Ok(UserRole::Student),
            "expert" => Ok(UserRole::Expert),
            other => Err(Error::Validation(format!("Invalid role: {}", other))),
        }
    }
}

/// Per-student assignment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AssignmentStatus {
    Pending,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::InProgress => "In Progress",
            AssignmentStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(AssignmentStatus::Pending),
            "In Progress" => Ok(AssignmentStatus::InProgress),
            "Completed" => Ok(AssignmentStatus::Completed),
            other => Err(Error::Validation(format!("Invalid status: {}", other))),
        }
    }
}

/// Submission review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Reviewed,
}

/// Task / notification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::Validation(format!("Invalid priority: {}", other))),
        }
    }
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskDueSoon,
    TaskOverdue,
    FeedbackReceived,
}

/// Opaque attachment reference from the external attachment store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub file_type: String,
}

/// Directory entry (id/name/email/role lookup; lifecycle owned elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A unit of work an expert defines and distributes to students
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub attachments: sqlx::types::Json<Vec<Attachment>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-student tracking row for one task
///
/// (task_id, student_id) is unique at the storage layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskAssignment {
    pub id: String,
    pub task_id: String,
    pub student_id: String,
    pub status: AssignmentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub submission_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student-authored answer tied to an assignment upon completion
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Submission {
    pub id: String,
    pub task_id: String,
    pub student_id: String,
    pub answer: Option<String>,
    pub status: SubmissionStatus,
    pub marks: Option<i64>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One per assignee, written at task fan-out time
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub task_id: String,
    pub expert_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_status_round_trips_wire_strings() {
        assert_eq!(AssignmentStatus::parse("Pending").unwrap(), AssignmentStatus::Pending);
        assert_eq!(
            AssignmentStatus::parse("In Progress").unwrap(),
            AssignmentStatus::InProgress
        );
        assert_eq!(AssignmentStatus::parse("Completed").unwrap(), AssignmentStatus::Completed);
        assert_eq!(AssignmentStatus::InProgress.as_str(), "In Progress");
    }

    #[test]
    fn assignment_status_rejects_unknown_strings() {
        assert!(AssignmentStatus::parse("in progress").is_err());
        assert!(AssignmentStatus::parse("Done").is_err());
        assert!(AssignmentStatus::parse("").is_err());
    }

    #[test]
    fn priority_defaults_are_parseable() {
        assert_eq!(Priority::parse("medium").unwrap(), Priority::Medium);
        assert!(Priority::parse("urgent").is_err());
    }
}
