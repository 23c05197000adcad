use std::collections::BTreeMap;

use tracing::debug;

use crate::api::CompanionService;
use crate::error::{CompanionError, Result};
use crate::models::UserMemory;

/// Ask every personality to answer `message`; returns name -> reply.
///
/// Empty input fails before anything is sent.
pub async fn compare_personalities<S>(
    service: &S,
    message: &str,
    context: Option<&UserMemory>,
) -> Result<BTreeMap<String, String>>
where
    S: CompanionService + ?Sized,
{
    let message = message.trim();
    if message.is_empty() {
        return Err(CompanionError::Validation { field: "message" });
    }

    debug!(with_context = context.is_some(), "comparing personalities");
    let comparison = service.compare_personalities(message, context).await?;
    Ok(comparison.responses)
}
