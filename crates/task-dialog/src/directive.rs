use crate::position::{classify, Zone};
use robot_gateway::MoveDirective;

/// Compute the gateway directive for moving an object between two zones.
///
/// Only the hot/cold pair is supported; anything involving `mild`, an
/// unclassifiable side, or the same zone twice has no directive.
pub fn resolve_directive(origin: &str, destination: &str) -> Option<MoveDirective> {
    match (classify(origin)?, classify(destination)?) {
        (Zone::Hot, Zone::Cold) => Some(MoveDirective::HotToCold),
        (Zone::Cold, Zone::Hot) => Some(MoveDirective::ColdToHot),
        _ => None,
    }
}
