//! User-facing texts

pub(super) const NO_ROBOTS: &str = "No Robots Available.";
pub(super) const TURNING_ON: &str = "Turning on...";
pub(super) const POWERED_ON: &str = "Powered on and ready.";
pub(super) const POWER_ON_FAILED: &str = "Sorry, I couldn't turn the robot on. Please try again.";
pub(super) const TURNING_OFF: &str = "Turning off...";
pub(super) const POWERED_OFF: &str = "Robot is powered off.";
pub(super) const POWER_OFF_FAILED: &str = "Sorry, I couldn't turn the robot off. Please try again.";
pub(super) const HELP: &str = "I can turn on or off, or move something to a destination.";
pub(super) const RECOGNIZER_UNAVAILABLE: &str =
    "Sorry, I couldn't understand that right now. Please try again.";

pub(super) const WHERE_IS_OBJECT: &str = "Where is the object right now?";
pub(super) const INVALID_POSITION: &str = "Sorry, that's not a valid position. Say hot, mild or cold.";
pub(super) const POSITION_GAVE_UP: &str =
    "I still don't know where the object is, so I'll skip that move.";
pub(super) const MILD_UNSUPPORTED: &str =
    "Sorry, I don't know how to pick up objects from the mild zone yet.";
pub(super) const CANNOT_DO: &str = "Sorry, I don't know how to do that yet.";
pub(super) const MOVE_FAILED: &str = "Sorry, I couldn't move. Please try again.";

pub(super) fn did_not_compute(intent: &str) -> String {
    format!("Sorry, did not compute. Please try asking in a different way (intent was {intent})")
}

pub(super) fn position_set(position: &str) -> String {
    format!("Position set to {position}.")
}

pub(super) fn moving(object: &str, destination: &str) -> String {
    format!("Okay, moving {object} to {destination}")
}

pub(super) fn finished_moving(object: &str, destination: &str) -> String {
    format!("I've finished moving {object} to {destination}")
}
