//! HTTP client for the robot-control API.

use crate::{
    CallContext, GatewayError, Interrupted, MoveDirective, Result, Robot, RobotGateway, SimpleMove,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};

const ROUTE_AVAILABLE: &str = "/robot/available";
const ROUTE_HEARTBEAT: &str = "/robot/heartbeat";
const ROUTE_START_SESSION: &str = "/robot/startsession";
const ROUTE_STOP_SESSION: &str = "/robot/stopsession";
const ROUTE_MULTI_MOVE: &str = "/robot/multimove";
const ROUTE_MOVE: &str = "/robot/move";

pub struct HttpRobotGateway {
    base_url: String,
    client: Client,
}

impl HttpRobotGateway {
    /// Create a client rooted at `base_url` (scheme required, trailing slash ignored).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::InvalidEndpoint(base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn send(
        &self,
        route: &'static str,
        request: RequestBuilder,
        ctx: &CallContext,
    ) -> Result<reqwest::Response> {
        let sent = ctx.run(request.timeout(ctx.remaining()).send()).await?;
        sent.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Interrupted(Interrupted::DeadlineExceeded)
            } else {
                tracing::warn!(route, error = %e, "gateway request failed");
                GatewayError::Transport(e.to_string())
            }
        })
    }

    /// Success is decided by the status class alone; the body is never inspected.
    async fn send_for_status(
        &self,
        route: &'static str,
        request: RequestBuilder,
        ctx: &CallContext,
    ) -> Result<bool> {
        let response = self.send(route, request, ctx).await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(route, status = status.as_u16(), "gateway call succeeded");
        } else {
            tracing::warn!(route, status = status.as_u16(), "gateway returned non-success status");
        }
        Ok(status.is_success())
    }
}

#[async_trait]
impl RobotGateway for HttpRobotGateway {
    async fn list_available_robots(&self, ctx: &CallContext) -> Result<Vec<Robot>> {
        let request = self.client.get(self.url(ROUTE_AVAILABLE));
        let response = self.send(ROUTE_AVAILABLE, request, ctx).await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = response.status().as_u16(),
                "robot discovery failed, treating as no robots"
            );
            return Ok(Vec::new());
        }

        let body = ctx
            .run(response.bytes())
            .await?
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let robots: Vec<Robot> =
            serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
                route: ROUTE_AVAILABLE,
                message: e.to_string(),
            })?;

        tracing::info!(count = robots.len(), "discovered robots");
        Ok(robots)
    }

    async fn heartbeat(
        &self,
        robot_id: &str,
        access_key: &str,
        ctx: &CallContext,
    ) -> Result<bool> {
        let request = self
            .client
            .get(self.url(ROUTE_HEARTBEAT))
            .query(&[("robotId", robot_id), ("key", access_key)]);
        self.send_for_status(ROUTE_HEARTBEAT, request, ctx).await
    }

    async fn start_session(&self, robot_id: &str, ctx: &CallContext) -> Result<bool> {
        let request = self
            .client
            .post(self.url(ROUTE_START_SESSION))
            .query(&[("robotId", robot_id)]);
        self.send_for_status(ROUTE_START_SESSION, request, ctx).await
    }

    async fn stop_session(&self, robot_id: &str, ctx: &CallContext) -> Result<bool> {
        let request = self
            .client
            .post(self.url(ROUTE_STOP_SESSION))
            .query(&[("robotId", robot_id)]);
        self.send_for_status(ROUTE_STOP_SESSION, request, ctx).await
    }

    async fn move_directive(
        &self,
        robot_id: &str,
        actuator_index: u32,
        directive: MoveDirective,
        ctx: &CallContext,
    ) -> Result<bool> {
        let actuator = actuator_index.to_string();
        let request = self.client.post(self.url(ROUTE_MULTI_MOVE)).query(&[
            ("robotId", robot_id),
            ("actuator", actuator.as_str()),
            ("command", directive.as_str()),
        ]);
        tracing::info!(robot_id, actuator_index, %directive, "requesting move");
        self.send_for_status(ROUTE_MULTI_MOVE, request, ctx).await
    }

    async fn move_simple(
        &self,
        object: &str,
        destination: &str,
        ctx: &CallContext,
    ) -> Result<bool> {
        let body = SimpleMove {
            object: object.to_string(),
            destination: destination.to_string(),
        };
        let request = self.client.post(self.url(ROUTE_MOVE)).json(&body);
        self.send_for_status(ROUTE_MOVE, request, ctx).await
    }
}
