//! Strict decoding of conversation-analysis payloads

use crate::{EntityCategory, Intent, IntentScore, RecognitionDecodeError, RecognitionResult};
use serde::Deserialize;
use std::collections::HashSet;

const RESULT_KIND: &str = "ConversationResult";
const PROJECT_KIND: &str = "Conversation";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    kind: String,
    result: AnalysisResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResult {
    query: String,
    prediction: Prediction,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    project_kind: Option<String>,
    intents: Vec<ScoredCategory>,
    #[serde(default)]
    entities: Vec<EntityMention>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoredCategory {
    category: String,
    confidence_score: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityMention {
    category: String,
    text: String,
}

/// Decode a recognizer response body into a typed [`RecognitionResult`].
///
/// Every intent must be one of the known names and carry a score in `[0, 1]`.
/// Entities of other categories are ignored.
pub fn decode_clu_response(body: &[u8]) -> Result<RecognitionResult, RecognitionDecodeError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if envelope.kind != RESULT_KIND {
        return Err(RecognitionDecodeError::UnexpectedKind(envelope.kind));
    }

    let prediction = envelope.result.prediction;
    if let Some(kind) = prediction.project_kind {
        if kind != PROJECT_KIND {
            return Err(RecognitionDecodeError::UnexpectedKind(kind));
        }
    }

    let mut seen = HashSet::new();
    let mut result = RecognitionResult::new(envelope.result.query);
    for scored in prediction.intents {
        let intent: Intent = scored
            .category
            .parse()
            .map_err(RecognitionDecodeError::UnknownIntent)?;
        if !scored.confidence_score.is_finite() || !(0.0..=1.0).contains(&scored.confidence_score)
        {
            return Err(RecognitionDecodeError::InvalidScore {
                intent: scored.category,
                score: scored.confidence_score,
            });
        }
        if !seen.insert(intent) {
            return Err(RecognitionDecodeError::DuplicateIntent(scored.category));
        }
        result.intents.push(IntentScore {
            intent,
            score: scored.confidence_score,
        });
    }

    for mention in prediction.entities {
        match mention.category.parse::<EntityCategory>() {
            Ok(category) => result.entities.offer(category, mention.text),
            Err(other) => tracing::debug!(category = %other, "ignoring entity category"),
        }
    }

    Ok(result)
}
