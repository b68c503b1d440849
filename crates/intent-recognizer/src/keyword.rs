//! Offline keyword recognizer for robot commands

use crate::{
    CallContext, EntityCategory, Intent, RecognitionResult, Recognizer, RecognizerError, Result,
};
use async_trait::async_trait;
use regex::Regex;

/// Regex-driven recognizer that needs no remote service.
///
/// Each intent has a pattern and a base confidence; utterances shorter than
/// twenty characters get a small boost since they tend to be direct commands.
pub struct KeywordRecognizer {
    patterns: Vec<(Intent, Regex, f64)>,
    movement: Regex,
}

impl KeywordRecognizer {
    pub fn new() -> std::result::Result<Self, RecognizerError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| RecognizerError::InvalidSettings(e.to_string()))
        };

        let patterns = vec![
            (
                Intent::TurnOn,
                compile(r"(?i)\b(turn|switch|power)\b.*\bon\b|\b(wake up|start up)\b")?,
                0.85,
            ),
            (
                Intent::TurnOff,
                compile(r"(?i)\b(turn|switch|power)\b.*\boff\b|\b(shut ?down|go to sleep)\b")?,
                0.85,
            ),
            (
                Intent::Move,
                compile(r"(?i)\b(move|put|place|take|bring|carry|transfer)\b")?,
                0.8,
            ),
            (
                Intent::Help,
                compile(r"(?i)\bhelp\b|what can you do")?,
                0.8,
            ),
        ];

        let movement = compile(
            r"(?i)^(?:please\s+)?(?:move|put|place|take|bring|carry|transfer)\s+(?:the\s+)?(?P<object>.+?)(?:\s+from\s+(?:the\s+)?(?P<origin>.+?))?\s+(?:to|into|onto|on(?:\s+to)?)\s+(?:the\s+)?(?P<destination>.+?)[.!?]*$",
        )?;

        Ok(Self { patterns, movement })
    }

    /// Classify synchronously; used by the async trait and handy for tools.
    pub fn classify(&self, utterance: &str) -> RecognitionResult {
        let text = utterance.trim();
        let mut result = RecognitionResult::new(text);
        let movement = self.movement.captures(text);
        // "put the power strip on the cold side" is a move, not a power command.
        let full_move = movement
            .as_ref()
            .is_some_and(|c| c.name("destination").is_some());

        for (intent, regex, base) in &self.patterns {
            if full_move && matches!(intent, Intent::TurnOn | Intent::TurnOff) {
                continue;
            }
            if regex.is_match(text) {
                result = result.with_intent(*intent, Self::confidence(*base, text));
            }
        }

        if let Some(captures) = movement {
            for (name, category) in [
                ("object", EntityCategory::Object),
                ("origin", EntityCategory::Origin),
                ("destination", EntityCategory::Destination),
            ] {
                if let Some(m) = captures.name(name) {
                    result.entities.offer(category, m.as_str().trim());
                }
            }
        }

        result
    }

    fn confidence(base: f64, text: &str) -> f64 {
        if text.len() < 20 {
            (base + 0.1).min(1.0)
        } else {
            base
        }
    }
}

#[async_trait]
impl Recognizer for KeywordRecognizer {
    fn is_configured(&self) -> bool {
        !self.patterns.is_empty()
    }

    async fn recognize(&self, utterance: &str, _ctx: &CallContext) -> Result<RecognitionResult> {
        let result = self.classify(utterance);
        tracing::debug!(
            intent = %result.top_intent().intent,
            "keyword recognizer classified utterance"
        );
        Ok(result)
    }
}
