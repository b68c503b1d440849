use crate::{CallContext, MoveDirective, Result, Robot, RobotGateway};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// A call observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListAvailableRobots,
    Heartbeat {
        robot_id: String,
        access_key: String,
    },
    StartSession {
        robot_id: String,
    },
    StopSession {
        robot_id: String,
    },
    MoveDirective {
        robot_id: String,
        actuator_index: u32,
        directive: MoveDirective,
    },
    MoveSimple {
        object: String,
        destination: String,
    },
}

/// In-process gateway with scripted answers. Every call is recorded.
pub struct MockGateway {
    robots: Vec<Robot>,
    heartbeat_ok: bool,
    start_ok: bool,
    stop_ok: bool,
    move_ok: bool,
    latency: Option<Duration>,
    discovery_latency: Option<Duration>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// A gateway with no robots where every operation succeeds.
    pub fn new() -> Self {
        Self {
            robots: Vec::new(),
            heartbeat_ok: true,
            start_ok: true,
            stop_ok: true,
            move_ok: true,
            latency: None,
            discovery_latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A gateway advertising one healthy robot at `localhost`.
    pub fn with_local_robot(id: u32) -> Self {
        Self::new().with_robots(vec![Self::robot(id, "localhost")])
    }

    pub fn robot(id: u32, address: &str) -> Robot {
        Robot {
            id,
            address: address.to_string(),
            port: 30002,
            access_key: Uuid::nil(),
            status: "Available".to_string(),
            make: "Mock".to_string(),
            model: "Arm".to_string(),
        }
    }

    pub fn with_robots(mut self, robots: Vec<Robot>) -> Self {
        self.robots = robots;
        self
    }

    pub fn with_heartbeat(mut self, ok: bool) -> Self {
        self.heartbeat_ok = ok;
        self
    }

    pub fn with_session_results(mut self, start_ok: bool, stop_ok: bool) -> Self {
        self.start_ok = start_ok;
        self.stop_ok = stop_ok;
        self
    }

    pub fn with_move_result(mut self, ok: bool) -> Self {
        self.move_ok = ok;
        self
    }

    /// Delay every answer, to exercise deadlines and cancellation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay only robot discovery; overrides [`MockGateway::with_latency`] for that call.
    pub fn with_discovery_latency(mut self, latency: Duration) -> Self {
        self.discovery_latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: GatewayCall) {
        tracing::debug!(?call, "mock gateway call");
        let latency = match call {
            GatewayCall::ListAvailableRobots => self.discovery_latency.or(self.latency),
            _ => self.latency,
        };
        self.calls.lock().push(call);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RobotGateway for MockGateway {
    async fn list_available_robots(&self, _ctx: &CallContext) -> Result<Vec<Robot>> {
        self.record(GatewayCall::ListAvailableRobots).await;
        Ok(self.robots.clone())
    }

    async fn heartbeat(
        &self,
        robot_id: &str,
        access_key: &str,
        _ctx: &CallContext,
    ) -> Result<bool> {
        self.record(GatewayCall::Heartbeat {
            robot_id: robot_id.to_string(),
            access_key: access_key.to_string(),
        })
        .await;
        Ok(self.heartbeat_ok)
    }

    async fn start_session(&self, robot_id: &str, _ctx: &CallContext) -> Result<bool> {
        self.record(GatewayCall::StartSession {
            robot_id: robot_id.to_string(),
        })
        .await;
        Ok(self.start_ok)
    }

    async fn stop_session(&self, robot_id: &str, _ctx: &CallContext) -> Result<bool> {
        self.record(GatewayCall::StopSession {
            robot_id: robot_id.to_string(),
        })
        .await;
        Ok(self.stop_ok)
    }

    async fn move_directive(
        &self,
        robot_id: &str,
        actuator_index: u32,
        directive: MoveDirective,
        _ctx: &CallContext,
    ) -> Result<bool> {
        self.record(GatewayCall::MoveDirective {
            robot_id: robot_id.to_string(),
            actuator_index,
            directive,
        })
        .await;
        Ok(self.move_ok)
    }

    async fn move_simple(
        &self,
        object: &str,
        destination: &str,
        _ctx: &CallContext,
    ) -> Result<bool> {
        self.record(GatewayCall::MoveSimple {
            object: object.to_string(),
            destination: destination.to_string(),
        })
        .await;
        Ok(self.move_ok)
    }
}
