//! Intent recognition for robot commands
//!
//! This crate turns one user utterance into a scored set of intents plus the
//! object/origin/destination entities a movement needs. Recognition is
//! pluggable: a remote conversation-analysis service, an offline keyword
//! recognizer, or a scripted mock for tests.

mod decode;
mod error;
mod keyword;
mod traits;
mod types;

#[cfg(feature = "clu")]
mod clu;
#[cfg(feature = "mock")]
mod mock;

pub use decode::decode_clu_response;
pub use error::{RecognitionDecodeError, RecognizerError, Result};
pub use keyword::KeywordRecognizer;
pub use traits::Recognizer;
pub use types::{Entities, EntityCategory, Intent, IntentScore, RecognitionResult, TopIntent};

#[cfg(feature = "clu")]
pub use clu::{CluRecognizer, CluSettings};
#[cfg(feature = "mock")]
pub use mock::ScriptedRecognizer;

pub use robot_gateway::CallContext;
