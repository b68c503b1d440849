use crate::{CallContext, MoveDirective, Result, Robot};
use async_trait::async_trait;

/// Operations offered by the robot-control API.
///
/// Boolean results report whether the API answered with a success status;
/// `Err` is reserved for calls that produced no usable answer at all.
#[async_trait]
pub trait RobotGateway: Send + Sync {
    /// List robots currently available for binding.
    async fn list_available_robots(&self, ctx: &CallContext) -> Result<Vec<Robot>>;

    /// Check that a robot controller is alive.
    async fn heartbeat(&self, robot_id: &str, access_key: &str, ctx: &CallContext)
        -> Result<bool>;

    /// Open a control session (powers the robot on).
    async fn start_session(&self, robot_id: &str, ctx: &CallContext) -> Result<bool>;

    /// Close the control session (powers the robot off).
    async fn stop_session(&self, robot_id: &str, ctx: &CallContext) -> Result<bool>;

    /// Run a canned zone-to-zone program on one actuator.
    async fn move_directive(
        &self,
        robot_id: &str,
        actuator_index: u32,
        directive: MoveDirective,
        ctx: &CallContext,
    ) -> Result<bool>;

    /// Legacy free-form move, superseded by [`RobotGateway::move_directive`].
    async fn move_simple(&self, object: &str, destination: &str, ctx: &CallContext)
        -> Result<bool>;
}
