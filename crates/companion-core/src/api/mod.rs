pub mod client;

pub use client::CompanionClient;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    HealthStatus, PersonalityComparison, PersonalityInfo, TransformRequest,
    TransformResponse, UserMemory,
};

/// The remote companion service, seen from the client.
///
/// `CompanionClient` talks HTTP; tests substitute in-memory stubs.
#[async_trait]
pub trait CompanionService: Send + Sync {
    /// Canned conversation used to demo memory extraction, returned verbatim
    async fn sample_messages(&self) -> Result<serde_json::Value>;

    /// `messages` is forwarded as the user wrote it
    async fn extract_memory(&self, messages: &serde_json::Value) -> Result<UserMemory>;

    async fn compare_personalities(
        &self,
        message: &str,
        context: Option<&UserMemory>,
    ) -> Result<PersonalityComparison>;

    async fn transform(&self, request: &TransformRequest) -> Result<TransformResponse>;

    async fn personalities(&self) -> Result<BTreeMap<String, PersonalityInfo>>;

    async fn health(&self) -> Result<HealthStatus>;
}
