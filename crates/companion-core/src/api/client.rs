use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::CompanionService;
use crate::error::{CompanionError, Result};
use crate::models::{
    CompareRequest, ExtractMemoryRequest, HealthStatus,
    PersonalityComparison, PersonalityInfo, TransformRequest, TransformResponse, UserMemory,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Clone)]
pub struct CompanionClient {
    client: Client,
    base_url: String,
}

impl CompanionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, operation: &'static str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, operation, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| transport(operation, source))?;

        decode(response, operation).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, operation: &'static str) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, operation, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| transport(operation, source))?;

        decode(response, operation).await
    }
}

fn transport(operation: &'static str, source: reqwest::Error) -> CompanionError {
    warn!(operation, error = %source, "request did not complete");
    CompanionError::Transport { operation, source }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, operation: &'static str) -> Result<T> {
    let status = response.status();
    debug!(operation, %status, "response");

    // Error bodies are not inspected
    if !status.is_success() {
        warn!(operation, %status, "service returned an error status");
        return Err(CompanionError::Status { operation, status });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| transport(operation, source))
}

#[async_trait]
impl CompanionService for CompanionClient {
    async fn sample_messages(&self) -> Result<serde_json::Value> {
        self.get_json("/api/sample-messages", "Loading sample messages").await
    }

    async fn extract_memory(&self, messages: &serde_json::Value) -> Result<UserMemory> {
        let body = ExtractMemoryRequest { messages };
        self.post_json("/api/extract-memory", &body, "Memory extraction").await
    }

    async fn compare_personalities(
        &self,
        message: &str,
        context: Option<&UserMemory>,
    ) -> Result<PersonalityComparison> {
        let body = CompareRequest { message, context };
        self.post_json("/api/compare-personalities", &body, "Personality comparison")
            .await
    }

    async fn transform(&self, request: &TransformRequest) -> Result<TransformResponse> {
        self.post_json("/api/transform-personality", request, "Chat").await
    }

    async fn personalities(&self) -> Result<BTreeMap<String, PersonalityInfo>> {
        self.get_json("/api/personalities", "Loading personalities").await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health", "Health check").await
    }
}
