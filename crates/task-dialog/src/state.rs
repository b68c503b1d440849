use core::fmt;
use intent_recognizer::Entities;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of one conversation (one user session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A requested movement, carried as the Movement sub-flow's input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub object: String,
    pub destination: String,
}

impl Movement {
    pub fn new(object: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            destination: destination.into(),
        }
    }

    pub fn from_entities(entities: &Entities) -> Self {
        Self {
            object: entities.object.clone().unwrap_or_default(),
            destination: entities.destination.clone().unwrap_or_default(),
        }
    }

    /// Object name for user-facing messages.
    pub fn object_label(&self) -> &str {
        if self.object.trim().is_empty() {
            "the object"
        } else {
            self.object.trim()
        }
    }
}

/// In-progress task of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    /// Robot bound by the last successful discovery
    pub robot_id: Option<String>,
    /// Set only while a Movement sub-flow is active
    pub pending_movement: Option<Movement>,
    /// Last known position of the manipulated object, as the user phrased it
    pub object_position: Option<String>,
}

/// Where the conversation will resume on the next utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DialogStep {
    /// No flow running; the next utterance starts the Main flow.
    #[default]
    Idle,
    /// Main flow prompted for a command.
    AwaitingCommand,
    /// Movement sub-flow asked where the object is.
    AwaitingPosition { movement: Movement, attempts: u32 },
}

impl DialogStep {
    pub fn is_waiting(&self) -> bool {
        !matches!(self, DialogStep::Idle)
    }
}

/// Everything persisted for one session between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub task: TaskState,
    pub step: DialogStep,
    pub updated_at: OffsetDateTime,
}

impl Default for ConversationRecord {
    fn default() -> Self {
        Self {
            task: TaskState::default(),
            step: DialogStep::Idle,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

impl ConversationRecord {
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// Drop any suspended step; a discarded Movement sub-flow takes its
    /// pending movement with it.
    pub fn abandon_flow(&mut self) {
        self.step = DialogStep::Idle;
        self.task.pending_movement = None;
    }

    /// Whether the record has been untouched for longer than `max_idle`.
    pub fn is_idle_for(&self, max_idle: std::time::Duration) -> bool {
        let idle = OffsetDateTime::now_utc() - self.updated_at;
        idle.whole_milliseconds() > max_idle.as_millis() as i128
    }
}
