use crate::DialogError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the outcome of a start/stop session call reaches the user.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionResultMode {
    /// Always confirm the power change, logging a failed call.
    #[default]
    Lenient,
    /// Report a failed call to the user instead of confirming.
    Strict,
}

/// Dialog behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Address a robot must advertise to be bound
    pub expected_robot_address: String,
    /// Actuator driven by directive moves
    pub actuator_index: u32,
    /// Prompt used when no follow-up prompt is supplied
    pub greeting: String,
    /// Prompts used when the Main flow restarts after a command
    pub follow_up_prompts: Vec<String>,
    /// Pick follow-up prompts at random instead of always the first
    pub randomize_follow_up: bool,
    pub session_result_mode: SessionResultMode,
    /// Invalid position replies tolerated before the movement is abandoned;
    /// `None` keeps asking forever
    pub max_position_attempts: Option<u32>,
    /// Deadline for each gateway or recognizer call
    pub call_timeout_ms: u64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            expected_robot_address: "localhost".to_string(),
            actuator_index: 1,
            greeting: "Hey! What would you like me to do?".to_string(),
            follow_up_prompts: vec![
                "What else can I do?".to_string(),
                "Anything else?".to_string(),
                "What's your next command?".to_string(),
                "I'm ready for my next task.".to_string(),
            ],
            randomize_follow_up: true,
            session_result_mode: SessionResultMode::Lenient,
            max_position_attempts: Some(3),
            call_timeout_ms: 10_000,
        }
    }
}

impl DialogConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), DialogError> {
        if self.expected_robot_address.trim().is_empty() {
            return Err(DialogError::Config(
                "expected_robot_address must not be empty".to_string(),
            ));
        }
        if self.greeting.trim().is_empty() {
            return Err(DialogError::Config("greeting must not be empty".to_string()));
        }
        if self.call_timeout_ms == 0 {
            return Err(DialogError::Config(
                "call_timeout_ms must be positive".to_string(),
            ));
        }
        if self.max_position_attempts == Some(0) {
            return Err(DialogError::Config(
                "max_position_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
