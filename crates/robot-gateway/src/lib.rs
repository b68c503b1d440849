//! robot-gateway: client side of the remote robot-control API
//!
//! This crate provides the types and the async trait used to discover robots,
//! check their heartbeat, toggle control sessions and issue movements. The
//! default build enables both the `http` backend and a `mock` backend so that
//! dialogs can be exercised without a live robot.

mod types;
pub use types::{MoveDirective, Robot, SimpleMove};

mod error;
pub use error::{GatewayError, Result};

mod call;
pub use call::{CallContext, Interrupted};

mod traits;
pub use traits::RobotGateway;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpRobotGateway;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{GatewayCall, MockGateway};
