//! Event types for the edutrack event system
//!
//! Outbound events are emitted after the primary database writes commit.
//! Delivery is at-least-once for live subscribers; a failed emission
//! never rolls back the writes that preceded it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Edutrack event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskEvent {
    /// A task was created and fanned out to its assignees
    TaskAssigned {
        task_id: String,
        expert_id: String,
        student_ids: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for task events
///
/// Subscribers receive events emitted after they subscribe; when the
/// channel is full the oldest events are dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TaskEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count, or an error when nobody is
    /// listening. Callers that treat events as advisory ignore the
    /// error.
    pub fn emit(&self, event: TaskEvent) -> Result<usize, broadcast::error::SendError<TaskEvent>> {
        self.tx.send(event)
    }
}
