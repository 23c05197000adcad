//! Request and response bodies of the companion service
//!
//! Response types default every field so a partial payload still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::ChatTurn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub habits: Vec<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionalPatterns {
    pub dominant_emotions: Vec<String>,
    pub emotional_triggers: Vec<String>,
    pub communication_style: String,
    pub stress_indicators: Vec<String>,
}

impl Default for EmotionalPatterns {
    fn default() -> Self {
        Self {
            dominant_emotions: Vec::new(),
            emotional_triggers: Vec::new(),
            communication_style: "neutral".to_string(),
            stress_indicators: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportantFacts {
    pub personal_info: Vec<String>,
    pub relationships: Vec<String>,
    pub goals: Vec<String>,
    pub events: Vec<String>,
}

/// Structured memory extracted from a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserMemory {
    pub preferences: Preferences,
    pub emotional_patterns: EmotionalPatterns,
    pub facts: ImportantFacts,
    pub summary: String,
}

/// Memory extraction body. `messages` is whatever JSON the user supplied.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractMemoryRequest<'a> {
    pub messages: &'a serde_json::Value,
}

/// Body of a chat turn request: the new message plus everything said before it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRequest {
    pub message: String,
    pub personality: String,
    pub history: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<UserMemory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformResponse {
    pub original_response: String,
    pub transformed_response: String,
    pub personality_used: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a UserMemory>,
}

/// Personality name mapped to that personality's reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityComparison {
    pub message: String,
    pub responses: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}
