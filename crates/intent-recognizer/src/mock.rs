use crate::{CallContext, RecognitionResult, Recognizer, RecognizerError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Recognizer that replays queued results in order.
///
/// Once the queue is empty every utterance is answered with an empty
/// result, whose top intent is `None`.
pub struct ScriptedRecognizer {
    configured: bool,
    script: Mutex<VecDeque<RecognitionResult>>,
    utterances: Mutex<Vec<String>>,
}

impl ScriptedRecognizer {
    pub fn new(script: impl IntoIterator<Item = RecognitionResult>) -> Self {
        Self {
            configured: true,
            script: Mutex::new(script.into_iter().collect()),
            utterances: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn push(&self, result: RecognitionResult) {
        self.script.lock().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.utterances.lock().len()
    }

    /// Utterances seen so far, in order.
    pub fn utterances(&self) -> Vec<String> {
        self.utterances.lock().clone()
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn recognize(&self, utterance: &str, _ctx: &CallContext) -> Result<RecognitionResult> {
        if !self.configured {
            return Err(RecognizerError::NotConfigured);
        }
        self.utterances.lock().push(utterance.to_string());
        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or_else(|| RecognitionResult::new(utterance)))
    }
}
