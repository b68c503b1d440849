use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A robot as advertised by the gateway's discovery route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Robot {
    pub id: u32,
    /// Network address the robot controller listens on
    #[serde(rename = "ipAddress")]
    pub address: String,
    pub port: u16,
    /// Key required by the heartbeat route
    #[serde(rename = "key")]
    pub access_key: Uuid,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "robotMake", default)]
    pub make: String,
    #[serde(rename = "robotModel", default)]
    pub model: String,
}

impl Robot {
    /// A robot can be bound only when its address is exactly the expected endpoint.
    pub fn is_eligible(&self, expected_address: &str) -> bool {
        self.address == expected_address
    }

    /// Identifier used by every session and movement route.
    pub fn robot_id(&self) -> String {
        self.id.to_string()
    }
}

/// Zone-to-zone transfer understood by the multi-move route.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MoveDirective {
    HotToCold,
    ColdToHot,
}

impl MoveDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirective::HotToCold => "HotToCold",
            MoveDirective::ColdToHot => "ColdToHot",
        }
    }
}

impl fmt::Display for MoveDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDirective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HotToCold" => Ok(MoveDirective::HotToCold),
            "ColdToHot" => Ok(MoveDirective::ColdToHot),
            other => Err(format!("unknown move directive: {other}")),
        }
    }
}

/// Body of the legacy free-form move route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleMove {
    pub object: String,
    pub destination: String,
}
