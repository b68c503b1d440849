//! Classification of free-text object positions into zones

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Canonical object locations on the work surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Hot,
    Mild,
    Cold,
}

impl Zone {
    /// Zones in the order keywords are checked.
    pub const ALL: [Zone; 3] = [Zone::Hot, Zone::Mild, Zone::Cold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Hot => "hot",
            Zone::Mild => "mild",
            Zone::Cold => "cold",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = String;

    /// Exact label match only; use [`classify`] for free text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| format!("not a zone: {s}"))
    }
}

/// Map free text to the first zone keyword it contains, case-insensitively.
///
/// Keywords are tried in the fixed order hot, mild, cold, so "hot or cold"
/// classifies as hot.
pub fn classify(text: &str) -> Option<Zone> {
    let lowered = text.to_lowercase();
    Zone::ALL
        .into_iter()
        .find(|zone| lowered.contains(zone.as_str()))
}

/// True iff `label` is exactly one of the canonical zone labels.
pub fn is_valid_zone(label: &str) -> bool {
    label.parse::<Zone>().is_ok()
}
