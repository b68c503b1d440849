use super::{messages, settle, Orchestrator, Turn};
use crate::{classify, resolve_directive, Movement, Result, TaskState, Zone};

/// How a Movement sub-flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOutcome {
    /// The robot moved the object.
    Completed,
    /// The object sits in a zone the robot cannot pick from.
    Unsupported,
    /// No directive exists for the requested zones.
    Rejected,
    /// The gateway refused or failed the move.
    Failed,
    /// Nothing to move, or the user never named a valid position.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementStatus {
    /// Suspended on the "where is the object" prompt.
    AwaitingPosition { movement: Movement, attempts: u32 },
    Ended(MovementOutcome),
}

impl Orchestrator {
    /// Check object position: ask for it only when it is unknown.
    pub(super) async fn check_object_position(
        &self,
        task: &mut TaskState,
        movement: Movement,
        attempts: u32,
        turn: &mut Turn<'_>,
    ) -> Result<MovementStatus> {
        if task.pending_movement.is_none() {
            tracing::debug!("no pending movement");
            return Ok(MovementStatus::Ended(MovementOutcome::Abandoned));
        }
        if task.object_position.is_none() {
            turn.prompt(messages::WHERE_IS_OBJECT);
            return Ok(MovementStatus::AwaitingPosition { movement, attempts });
        }
        self.move_object(task, &movement, turn).await
    }

    /// Set object position from the user's answer to the position prompt.
    pub(super) async fn set_object_position(
        &self,
        task: &mut TaskState,
        movement: Movement,
        attempts: u32,
        input: &str,
        turn: &mut Turn<'_>,
    ) -> Result<MovementStatus> {
        match classify(input) {
            None => {
                turn.notice(messages::INVALID_POSITION);
                let attempts = attempts.saturating_add(1);
                if self
                    .config
                    .max_position_attempts
                    .is_some_and(|max| attempts >= max)
                {
                    tracing::info!(attempts, "giving up on object position");
                    turn.notice(messages::POSITION_GAVE_UP);
                    return Ok(MovementStatus::Ended(MovementOutcome::Abandoned));
                }
                self.check_object_position(task, movement, attempts, turn)
                    .await
            }
            Some(Zone::Mild) => {
                turn.notice(messages::MILD_UNSUPPORTED);
                Ok(MovementStatus::Ended(MovementOutcome::Unsupported))
            }
            Some(zone) => {
                tracing::debug!(%zone, "object position set");
                turn.notice(messages::position_set(input));
                task.object_position = Some(input.to_string());
                self.move_object(task, &movement, turn).await
            }
        }
    }

    /// Move: resolve a directive from the known position and run it.
    async fn move_object(
        &self,
        task: &mut TaskState,
        movement: &Movement,
        turn: &mut Turn<'_>,
    ) -> Result<MovementStatus> {
        let destination = movement.destination.trim();
        let directive = match task.object_position.as_deref() {
            Some(origin) if !destination.is_empty() => resolve_directive(origin, destination),
            _ => None,
        };
        let Some(directive) = directive else {
            turn.notice(messages::CANNOT_DO);
            return Ok(MovementStatus::Ended(MovementOutcome::Rejected));
        };

        let object = movement.object_label();
        turn.notice(messages::moving(object, destination));

        let robot_id = task.robot_id.clone().unwrap_or_default();
        let ctx = turn.call_context();
        let moved = settle(
            "move_directive",
            ctx.run(self.gateway.move_directive(
                &robot_id,
                self.config.actuator_index,
                directive,
                &ctx,
            ))
            .await,
            false,
        )?;
        if !moved {
            tracing::warn!(%directive, robot_id = %robot_id, "move failed");
            turn.notice(messages::MOVE_FAILED);
            return Ok(MovementStatus::Ended(MovementOutcome::Failed));
        }

        task.object_position = Some(destination.to_string());
        turn.notice(messages::finished_moving(object, destination));
        Ok(MovementStatus::Ended(MovementOutcome::Completed))
    }
}
