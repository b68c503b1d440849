use super::{messages, settle, MovementStatus, Orchestrator, Turn};
use crate::{DialogError, DialogStep, Movement, Result, SessionResultMode, TaskState};
use intent_recognizer::{Intent, RecognitionResult, RecognizerError};
use rand::seq::SliceRandom;
use robot_gateway::Interrupted;

impl Orchestrator {
    /// Intro: bind a live robot and ask for a command.
    pub(super) async fn intro(
        &self,
        task: &mut TaskState,
        greeting: Option<&str>,
        turn: &mut Turn<'_>,
    ) -> Result<DialogStep> {
        if !self.recognizer.is_configured() {
            tracing::error!("intent recognizer is not configured");
            return Err(DialogError::RecognizerNotConfigured);
        }

        let ctx = turn.call_context();
        let robots = settle(
            "list_available_robots",
            ctx.run(self.gateway.list_available_robots(&ctx)).await,
            Vec::new(),
        )?;
        let Some(robot) = robots
            .into_iter()
            .find(|r| r.is_eligible(&self.config.expected_robot_address))
        else {
            tracing::info!(
                expected = %self.config.expected_robot_address,
                "no eligible robot"
            );
            turn.notice(messages::NO_ROBOTS);
            return Ok(DialogStep::Idle);
        };

        let robot_id = robot.robot_id();
        let access_key = robot.access_key.to_string();
        let ctx = turn.call_context();
        let alive = settle(
            "heartbeat",
            ctx.run(self.gateway.heartbeat(&robot_id, &access_key, &ctx))
                .await,
            false,
        )?;
        if !alive {
            tracing::info!(robot_id = %robot_id, "robot failed heartbeat");
            turn.notice(messages::NO_ROBOTS);
            return Ok(DialogStep::Idle);
        }

        tracing::debug!(robot_id = %robot_id, "robot bound");
        task.robot_id = Some(robot_id);
        turn.prompt(greeting.unwrap_or(self.config.greeting.as_str()));
        Ok(DialogStep::AwaitingCommand)
    }

    /// Act: classify the utterance and dispatch on the top intent.
    pub(super) async fn act(
        &self,
        task: &mut TaskState,
        utterance: &str,
        turn: &mut Turn<'_>,
    ) -> Result<DialogStep> {
        let Some(result) = self.recognize(utterance, turn).await? else {
            turn.notice(messages::RECOGNIZER_UNAVAILABLE);
            return self.restart(task, turn).await;
        };

        let top = result.top_intent();
        tracing::info!(intent = %top.intent, score = top.score, "recognized");
        let robot_id = task.robot_id.clone().unwrap_or_default();

        match top.intent {
            Intent::TurnOn => {
                turn.notice(messages::TURNING_ON);
                let ctx = turn.call_context();
                let ok = settle(
                    "start_session",
                    ctx.run(self.gateway.start_session(&robot_id, &ctx)).await,
                    false,
                )?;
                self.report_power(ok, turn, messages::POWERED_ON, messages::POWER_ON_FAILED);
            }
            Intent::TurnOff => {
                turn.notice(messages::TURNING_OFF);
                let ctx = turn.call_context();
                let ok = settle(
                    "stop_session",
                    ctx.run(self.gateway.stop_session(&robot_id, &ctx)).await,
                    false,
                )?;
                self.report_power(ok, turn, messages::POWERED_OFF, messages::POWER_OFF_FAILED);
            }
            Intent::Move => {
                let movement = Movement::from_entities(&result.entities);
                task.pending_movement = Some(movement.clone());
                let status = self.check_object_position(task, movement, 0, turn).await?;
                return self.after_movement(task, status, turn).await;
            }
            Intent::Help => turn.notice(messages::HELP),
            Intent::None => turn.notice(messages::did_not_compute(top.intent.as_str())),
        }

        self.restart(task, turn).await
    }

    /// Return from the Movement sub-flow: stay suspended, or finish the Main flow.
    pub(super) async fn after_movement(
        &self,
        task: &mut TaskState,
        status: MovementStatus,
        turn: &mut Turn<'_>,
    ) -> Result<DialogStep> {
        match status {
            MovementStatus::AwaitingPosition { movement, attempts } => {
                Ok(DialogStep::AwaitingPosition { movement, attempts })
            }
            MovementStatus::Ended(outcome) => {
                tracing::debug!(?outcome, "movement ended");
                task.pending_movement = None;
                self.restart(task, turn).await
            }
        }
    }

    /// Final: loop back to Intro with a follow-up prompt.
    ///
    /// The command has already run by now, so a cancelled Intro ends the flow
    /// and the task state reached so far is kept.
    async fn restart(&self, task: &mut TaskState, turn: &mut Turn<'_>) -> Result<DialogStep> {
        let follow_up = self.follow_up_prompt();
        match self.intro(task, follow_up.as_deref(), turn).await {
            Err(DialogError::Cancelled) => {
                tracing::info!("conversation cancelled after its command ran");
                Ok(DialogStep::Idle)
            }
            other => other,
        }
    }

    fn follow_up_prompt(&self) -> Option<String> {
        let prompts = &self.config.follow_up_prompts;
        if self.config.randomize_follow_up {
            prompts.choose(&mut rand::thread_rng()).cloned()
        } else {
            prompts.first().cloned()
        }
    }

    /// `Ok(None)` when the recognizer failed in a way the conversation survives.
    async fn recognize(
        &self,
        utterance: &str,
        turn: &Turn<'_>,
    ) -> Result<Option<RecognitionResult>> {
        let ctx = turn.call_context();
        match ctx.run(self.recognizer.recognize(utterance, &ctx)).await {
            Ok(Ok(result)) => Ok(Some(result)),
            Err(Interrupted::Cancelled) => Err(DialogError::Cancelled),
            Ok(Err(e)) if e.is_cancelled() => Err(DialogError::Cancelled),
            Ok(Err(RecognizerError::NotConfigured)) => Err(DialogError::RecognizerNotConfigured),
            Err(Interrupted::DeadlineExceeded) => {
                tracing::warn!("intent recognition timed out");
                Ok(None)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "intent recognition failed");
                Ok(None)
            }
        }
    }

    fn report_power(&self, ok: bool, turn: &mut Turn<'_>, done: &str, failed: &str) {
        match (ok, self.config.session_result_mode) {
            (true, _) => turn.notice(done),
            (false, SessionResultMode::Lenient) => {
                tracing::warn!("session call unsuccessful, confirming anyway");
                turn.notice(done);
            }
            (false, SessionResultMode::Strict) => turn.notice(failed),
        }
    }
}
