use crate::Interrupted;
use thiserror::Error;

pub type Result<T, E = GatewayError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid gateway endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status} from {route}")]
    Status { route: &'static str, status: u16 },
    #[error("malformed response from {route}: {message}")]
    Decode { route: &'static str, message: String },
    #[error("call interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

impl GatewayError {
    /// True when the call was abandoned because its conversation ended.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Interrupted(Interrupted::Cancelled))
    }
}
