//! Memory extraction and the sample conversation that feeds it

use tracing::debug;

use crate::api::CompanionService;
use crate::error::{CompanionError, Result};
use crate::models::UserMemory;

/// Parse the user's input as JSON.
///
/// Only syntax is checked here. The service owns the shape of a message
/// list and rejects anything else with a non-2xx status.
pub fn parse_messages(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(CompanionError::Parse)
}

/// Parse `raw` and ask the service to extract memory from it.
///
/// Nothing is sent when `raw` is not valid JSON.
pub async fn extract_memory<S>(service: &S, raw: &str) -> Result<UserMemory>
where
    S: CompanionService + ?Sized,
{
    let messages = parse_messages(raw)?;
    debug!(messages = messages.as_array().map_or(0, Vec::len), "extracting memory");
    service.extract_memory(&messages).await
}

/// Fetch the sample conversation, pretty-printed for an editable input box
pub async fn load_sample<S>(service: &S) -> Result<String>
where
    S: CompanionService + ?Sized,
{
    let sample = service.sample_messages().await?;
    serde_json::to_string_pretty(&sample).map_err(CompanionError::Parse)
}

/// Plain-text rendering of a memory, one labelled section per category
pub fn format_memory(memory: &UserMemory) -> Vec<(String, Vec<String>)> {
    let p = &memory.preferences;
    let e = &memory.emotional_patterns;
    let f = &memory.facts;

    vec![
        ("Likes".to_string(), p.likes.clone()),
        ("Dislikes".to_string(), p.dislikes.clone()),
        ("Habits".to_string(), p.habits.clone()),
        ("Interests".to_string(), p.interests.clone()),
        ("Dominant Emotions".to_string(), e.dominant_emotions.clone()),
        (
            "Communication Style".to_string(),
            vec![e.communication_style.clone()],
        ),
        ("Emotional Triggers".to_string(), e.emotional_triggers.clone()),
        ("Stress Indicators".to_string(), e.stress_indicators.clone()),
        ("Personal Info".to_string(), f.personal_info.clone()),
        ("Relationships".to_string(), f.relationships.clone()),
        ("Goals".to_string(), f.goals.clone()),
        ("Events".to_string(), f.events.clone()),
        ("Summary".to_string(), vec![memory.summary.clone()]),
    ]
}
