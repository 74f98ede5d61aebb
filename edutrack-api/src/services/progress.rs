//! Progress aggregation
//!
//! Pure read-side computation over assignment rows. Nothing here is
//! persisted or cached; every caller recomputes from current rows, so a
//! summary and a detail list read moments apart may differ.

use chrono::{DateTime, Utc};
use edutrack_common::db::models::AssignmentStatus;
use serde::Serialize;
use std::collections::HashMap;

/// Minimal projection of an assignment row for aggregation
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub status: AssignmentStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Status counts for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub completion_rate: i64,
}

/// Task detail analytics: counts plus average completion time
#[derive(Debug, Clone, Serialize)]
pub struct TaskAnalytics {
    #[serde(flatten)]
    pub progress: TaskProgress,
    pub avg_completion_days: i64,
}

/// One assignment row attributed to a student, for the leaderboard
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub student_id: String,
    pub student_name: String,
    pub status: AssignmentStatus,
}

/// Per-student aggregate across the supplied tasks
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub student_id: String,
    pub name: String,
    pub completed: i64,
    pub total: i64,
    pub completion_rate: i64,
}

fn rate(completed: i64, total: i64) -> i64 {
    if total > 0 {
        ((completed as f64) * 100.0 / (total as f64)).round() as i64
    } else {
        0
    }
}

/// Count assignment rows by status
pub fn per_task(rows: &[ProgressRow]) -> TaskProgress {
    let total = rows.len() as i64;
    let completed = rows
        .iter()
        .filter(|r| r.status == AssignmentStatus::Completed)
        .count() as i64;
    let in_progress = rows
        .iter()
        .filter(|r| r.status == AssignmentStatus::InProgress)
        .count() as i64;
    let pending = rows
        .iter()
        .filter(|r| r.status == AssignmentStatus::Pending)
        .count() as i64;

    TaskProgress {
        total,
        completed,
        in_progress,
        pending,
        completion_rate: rate(completed, total),
    }
}

/// Counts plus mean completion time in whole days
///
/// Rows without a completed_at timestamp are skipped, never an error.
pub fn per_task_detailed(task_created_at: DateTime<Utc>, rows: &[ProgressRow]) -> TaskAnalytics {
    let progress = per_task(rows);

    let completion_secs: Vec<i64> = rows
        .iter()
        .filter_map(|r| r.completed_at)
        .map(|completed_at| (completed_at - task_created_at).num_seconds())
        .collect();

    let avg_completion_days = if completion_secs.is_empty() {
        0
    } else {
        let avg_secs = completion_secs.iter().sum::<i64>() as f64 / completion_secs.len() as f64;
        (avg_secs / 86_400.0).round() as i64
    };

    TaskAnalytics {
        progress,
        avg_completion_days,
    }
}

/// Rank students by completion rate across the supplied assignment rows
///
/// First-seen order is preserved for equal rates; callers cap the result
/// (the HTTP layer keeps the top 10).
pub fn leaderboard(rows: &[LeaderboardRow]) -> Vec<LeaderboardEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (String, i64, i64)> = HashMap::new();

    for row in rows {
        let entry = totals.entry(row.student_id.clone()).or_insert_with(|| {
            order.push(row.student_id.clone());
            (row.student_name.clone(), 0, 0)
        });
        entry.2 += 1;
        if row.status == AssignmentStatus::Completed {
            entry.1 += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = order
        .into_iter()
        .map(|student_id| {
            let (name, completed, total) = totals.remove(&student_id).unwrap_or_default();
            LeaderboardEntry {
                student_id,
                name,
                completed,
                total,
                completion_rate: rate(completed, total),
            }
        })
        .collect();

    // Stable sort keeps first-seen order among equal rates
    entries.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(status: AssignmentStatus, completed_at: Option<DateTime<Utc>>) -> ProgressRow {
        ProgressRow { status, completed_at }
    }

    #[test]
    fn one_of_each_status_gives_rate_33() {
        let rows = vec![
            row(AssignmentStatus::Completed, Some(Utc::now())),
            row(AssignmentStatus::InProgress, None),
            row(AssignmentStatus::Pending, None),
        ];
        let progress = per_task(&rows);
        assert_eq!(
            progress,
            TaskProgress {
                total: 3,
                completed: 1,
                in_progress: 1,
                pending: 1,
                completion_rate: 33,
            }
        );
    }

    #[test]
    fn empty_rows_give_zero_rate_not_division_error() {
        let progress = per_task(&[]);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.completion_rate, 0);
    }

    #[test]
    fn status_counts_always_sum_to_total() {
        let rows = vec![
            row(AssignmentStatus::Completed, Some(Utc::now())),
            row(AssignmentStatus::Completed, None),
            row(AssignmentStatus::Pending, None),
            row(AssignmentStatus::InProgress, None),
            row(AssignmentStatus::Pending, None),
        ];
        let p = per_task(&rows);
        assert_eq!(p.pending + p.in_progress + p.completed, p.total);
        assert!((0..=100).contains(&p.completion_rate));
    }

    #[test]
    fn avg_completion_days_rounds_to_whole_days() {
        let created = Utc::now();
        let rows = vec![
            row(AssignmentStatus::Completed, Some(created + Duration::days(2))),
            row(AssignmentStatus::Completed, Some(created + Duration::days(4))),
            row(AssignmentStatus::Pending, None),
        ];
        let analytics = per_task_detailed(created, &rows);
        assert_eq!(analytics.avg_completion_days, 3);
    }

    #[test]
    fn avg_completion_days_skips_null_completed_at() {
        let created = Utc::now();
        // Completed status but no timestamp: tolerated, not counted
        let rows = vec![row(AssignmentStatus::Completed, None)];
        let analytics = per_task_detailed(created, &rows);
        assert_eq!(analytics.avg_completion_days, 0);
    }

    fn lrow(student: &str, status: AssignmentStatus) -> LeaderboardRow {
        LeaderboardRow {
            student_id: student.to_string(),
            student_name: student.to_uppercase(),
            status,
        }
    }

    #[test]
    fn leaderboard_sorts_by_completion_rate_descending() {
        let rows = vec![
            lrow("a", AssignmentStatus::Pending),
            lrow("a", AssignmentStatus::Completed),
            lrow("b", AssignmentStatus::Completed),
            lrow("b", AssignmentStatus::Completed),
            lrow("c", AssignmentStatus::Pending),
        ];
        let board = leaderboard(&rows);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].student_id, "b");
        assert_eq!(board[0].completion_rate, 100);
        assert_eq!(board[1].student_id, "a");
        assert_eq!(board[1].completion_rate, 50);
        assert_eq!(board[2].student_id, "c");
        assert_eq!(board[2].completion_rate, 0);
    }

    #[test]
    fn leaderboard_counts_totals_per_student() {
        let rows = vec![
            lrow("a", AssignmentStatus::Completed),
            lrow("a", AssignmentStatus::InProgress),
            lrow("a", AssignmentStatus::Pending),
        ];
        let board = leaderboard(&rows);
        assert_eq!(board[0].total, 3);
        assert_eq!(board[0].completed, 1);
        assert_eq!(board[0].completion_rate, 33);
    }
}
