#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use companion_core::models::{
    HealthStatus, PersonalityComparison, PersonalityInfo, TransformRequest,
    TransformResponse, UserMemory,
};
use companion_core::{ChatTurn, ChatView, CompanionError, CompanionService, Result};

/// In-memory service: echoes chat turns, counts every call
#[derive(Default)]
pub struct StubService {
    pub calls: AtomicUsize,
    pub fail_transform: bool,
    pub reply: Option<String>,
    pub transforms: Mutex<Vec<TransformRequest>>,
    pub extracted: Mutex<Vec<serde_json::Value>>,
}

impl StubService {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_transform: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn unavailable(operation: &'static str) -> CompanionError {
    CompanionError::Status {
        operation,
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[async_trait]
impl CompanionService for StubService {
    async fn sample_messages(&self) -> Result<serde_json::Value> {
        self.hit();
        Ok(serde_json::json!([
            { "content": "I just adopted a dog named Biscuit", "sender": "user" },
            { "content": "Work has been stressful lately", "sender": "user" }
        ]))
    }

    async fn extract_memory(&self, messages: &serde_json::Value) -> Result<UserMemory> {
        self.hit();
        self.extracted.lock().unwrap().push(messages.clone());
        let mut memory = UserMemory::default();
        memory.facts.relationships.push("dog named Biscuit".to_string());
        let count = messages.as_array().map_or(0, Vec::len);
        memory.summary = format!("{} messages analysed", count);
        Ok(memory)
    }

    async fn compare_personalities(
        &self,
        message: &str,
        _context: Option<&UserMemory>,
    ) -> Result<PersonalityComparison> {
        self.hit();
        let mut responses = BTreeMap::new();
        responses.insert("Calm Mentor".to_string(), format!("Reflect on: {}", message));
        responses.insert("Witty Friend".to_string(), format!("lol {}", message));
        Ok(PersonalityComparison {
            message: message.to_string(),
            responses,
        })
    }

    async fn transform(&self, request: &TransformRequest) -> Result<TransformResponse> {
        self.hit();
        self.transforms.lock().unwrap().push(request.clone());
        if self.fail_transform {
            return Err(unavailable("Chat"));
        }
        let text = self
            .reply
            .clone()
            .unwrap_or_else(|| format!("re: {}", request.message));
        Ok(TransformResponse {
            original_response: String::new(),
            transformed_response: text,
            personality_used: request.personality.clone(),
        })
    }

    async fn personalities(&self) -> Result<BTreeMap<String, PersonalityInfo>> {
        self.hit();
        Ok(BTreeMap::new())
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.hit();
        Ok(HealthStatus {
            status: "healthy".to_string(),
            service: "stub".to_string(),
            version: "0".to_string(),
        })
    }
}

/// View that remembers what it was asked to draw
#[derive(Default)]
pub struct RecordingView {
    pub rendered: Vec<ChatTurn>,
    pub typing: bool,
    pub errors: Vec<String>,
}

impl ChatView for RecordingView {
    fn render_turn(&mut self, turn: &ChatTurn) {
        self.rendered.push(turn.clone());
    }

    fn show_typing(&mut self) {
        self.typing = true;
    }

    fn hide_typing(&mut self) {
        self.typing = false;
    }

    fn notify_error(&mut self, error: &CompanionError) {
        self.errors.push(error.to_string());
    }
}
