//! task-dialog: conversational control of a remote robot
//!
//! A conversation alternates between the Main flow (bind a robot, take a
//! command, act on it) and the Movement sub-flow (learn where the object is,
//! then move it). Each user utterance advances the persisted
//! [`ConversationRecord`] by exactly one turn; [`DialogEngine`] serializes
//! turns per session and keeps records in a [`TaskStore`].

mod config;
mod directive;
mod engine;
mod error;
mod flow;
mod position;
mod state;
mod store;

pub use config::{DialogConfig, SessionResultMode};
pub use directive::resolve_directive;
pub use engine::DialogEngine;
pub use error::{DialogError, Result, StoreError};
pub use flow::{
    Message, MessageKind, MovementOutcome, MovementStatus, Orchestrator, TurnOutput, TurnStatus,
};
pub use position::{classify, is_valid_zone, Zone};
pub use state::{ConversationRecord, DialogStep, Movement, SessionId, TaskState};
pub use store::{JsonFileTaskStore, MemoryTaskStore, TaskStore};

pub use robot_gateway::MoveDirective;
