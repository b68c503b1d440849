use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// User goals the robot front-end understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Move,
    TurnOn,
    TurnOff,
    Help,
    None,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Move,
        Intent::TurnOn,
        Intent::TurnOff,
        Intent::Help,
        Intent::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Move => "Move",
            Intent::TurnOn => "TurnOn",
            Intent::TurnOff => "TurnOff",
            Intent::Help => "Help",
            Intent::None => "None",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Entity categories a movement cares about.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    Object,
    Origin,
    Destination,
}

impl FromStr for EntityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Object" => Ok(EntityCategory::Object),
            "Origin" => Ok(EntityCategory::Origin),
            "Destination" => Ok(EntityCategory::Destination),
            other => Err(other.to_string()),
        }
    }
}

/// Extracted entities; only the first mention of each category is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub object: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl Entities {
    /// Record an entity unless its category is already filled.
    pub fn offer(&mut self, category: EntityCategory, text: impl Into<String>) {
        let slot = match category {
            EntityCategory::Object => &mut self.object,
            EntityCategory::Origin => &mut self.origin,
            EntityCategory::Destination => &mut self.destination,
        };
        if slot.is_none() {
            *slot = Some(text.into());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    pub score: f64,
}

/// The winning intent of a recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopIntent {
    pub intent: Intent,
    pub score: f64,
}

/// One recognizer answer, consumed once per dialog turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    /// Scored intents in the order the recognizer reported them
    pub intents: Vec<IntentScore>,
    pub entities: Entities,
}

impl RecognitionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_intent(mut self, intent: Intent, score: f64) -> Self {
        self.intents.push(IntentScore { intent, score });
        self
    }

    pub fn with_entity(mut self, category: EntityCategory, text: impl Into<String>) -> Self {
        self.entities.offer(category, text);
        self
    }

    /// Entry with the strictly greatest score; the first one wins a tie.
    /// Without any positive score the result is `None` at 0.0.
    pub fn top_intent(&self) -> TopIntent {
        let mut top = TopIntent {
            intent: Intent::None,
            score: 0.0,
        };
        for entry in &self.intents {
            if entry.score > top.score {
                top = TopIntent {
                    intent: entry.intent,
                    score: entry.score,
                };
            }
        }
        top
    }
}
