//! The Main and Movement flows, advanced one utterance at a time.
//!
//! A conversation is a [`ConversationRecord`]: the task state plus the
//! [`DialogStep`] to resume at. [`Orchestrator::handle_turn`] consumes a record
//! and one utterance and returns the advanced record together with the
//! messages to show the user. Nothing is kept between calls, so the caller
//! owns persistence and per-session serialization.

mod main_flow;
mod messages;
mod movement;

#[cfg(test)]
mod tests;

pub use movement::{MovementOutcome, MovementStatus};

use crate::{ConversationRecord, DialogConfig, DialogError, DialogStep, Result};
use intent_recognizer::Recognizer;
use robot_gateway::{CallContext, GatewayError, Interrupted, RobotGateway};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Informational; no answer expected
    Notice,
    /// Question the next utterance answers
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The conversation is suspended waiting for the next utterance.
    AwaitingInput,
    /// The Main flow ended; the next utterance starts it over.
    FlowEnded,
}

/// Everything one turn produced for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutput {
    pub messages: Vec<Message>,
    pub status: TurnStatus,
}

impl TurnOutput {
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }
}

/// Messages and call scope of the turn in progress.
struct Turn<'a> {
    messages: Vec<Message>,
    timeout: Duration,
    cancel: &'a CancellationToken,
}

impl<'a> Turn<'a> {
    fn new(timeout: Duration, cancel: &'a CancellationToken) -> Self {
        Self {
            messages: Vec::new(),
            timeout,
            cancel,
        }
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            kind: MessageKind::Notice,
            text: text.into(),
        });
    }

    fn prompt(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            kind: MessageKind::Prompt,
            text: text.into(),
        });
    }

    /// Fresh deadline for one external call, cancelled with the conversation.
    fn call_context(&self) -> CallContext {
        CallContext::new(self.timeout, self.cancel.child_token())
    }

    fn finish(self, step: &DialogStep) -> TurnOutput {
        let status = if step.is_waiting() {
            TurnStatus::AwaitingInput
        } else {
            TurnStatus::FlowEnded
        };
        TurnOutput {
            messages: self.messages,
            status,
        }
    }
}

/// Collapse the outcome of a gateway call.
///
/// Cancellation aborts the turn. Any other failure is logged and reported
/// as `fallback`, the same as an unsuccessful HTTP status.
fn settle<T>(
    op: &'static str,
    outcome: core::result::Result<robot_gateway::Result<T>, Interrupted>,
    fallback: T,
) -> Result<T> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Err(Interrupted::Cancelled) => Err(DialogError::Cancelled),
        Ok(Err(e)) if e.is_cancelled() => Err(DialogError::Cancelled),
        Err(Interrupted::DeadlineExceeded) | Ok(Err(GatewayError::Interrupted(_))) => {
            tracing::warn!(op, "gateway call timed out");
            Ok(fallback)
        }
        Ok(Err(e)) => {
            tracing::warn!(op, error = %e, "gateway call failed");
            Ok(fallback)
        }
    }
}

/// Drives conversations against an injected gateway and recognizer.
pub struct Orchestrator {
    gateway: Arc<dyn RobotGateway>,
    recognizer: Arc<dyn Recognizer>,
    config: DialogConfig,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn RobotGateway>,
        recognizer: Arc<dyn Recognizer>,
        config: DialogConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gateway,
            recognizer,
            config,
        })
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    /// Start the Main flow from its first step, discarding any suspended step.
    pub async fn begin(
        &self,
        mut record: ConversationRecord,
        cancel: &CancellationToken,
    ) -> Result<(ConversationRecord, TurnOutput)> {
        record.abandon_flow();
        self.handle_turn(record, "", cancel).await
    }

    /// Advance the conversation by one utterance.
    ///
    /// On `Err` the record is dropped; callers keep their last persisted copy.
    pub async fn handle_turn(
        &self,
        mut record: ConversationRecord,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<(ConversationRecord, TurnOutput)> {
        let mut turn = Turn::new(self.config.call_timeout(), cancel);
        let step = std::mem::take(&mut record.step);
        tracing::debug!(?step, "handling turn");

        let next = match step {
            DialogStep::Idle => self.intro(&mut record.task, None, &mut turn).await?,
            DialogStep::AwaitingCommand => self.act(&mut record.task, input, &mut turn).await?,
            DialogStep::AwaitingPosition { movement, attempts } => {
                let status = self
                    .set_object_position(&mut record.task, movement, attempts, input, &mut turn)
                    .await?;
                self.after_movement(&mut record.task, status, &mut turn)
                    .await?
            }
        };

        record.step = next;
        record.touch();
        let output = turn.finish(&record.step);
        Ok((record, output))
    }
}
