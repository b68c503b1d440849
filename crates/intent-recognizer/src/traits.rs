use crate::{CallContext, RecognitionResult, Result};
use async_trait::async_trait;

/// Classifies one utterance into intents and entities.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Whether the recognizer has everything it needs to serve requests.
    /// Callers must check this before the first `recognize`.
    fn is_configured(&self) -> bool;

    async fn recognize(&self, utterance: &str, ctx: &CallContext) -> Result<RecognitionResult>;
}
