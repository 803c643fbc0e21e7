//! Ingestion Trigger

use axum::{extract::State, Json};
use tracing::info;

use crate::error::{ApiError, MessageResponse};
use crate::SharedState;

/// Poll the station feed and store the result
pub async fn fetch_and_store(
    State(state): State<SharedState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let ctx = state.request_context();
    let summary = state.service.ingest(&ctx).await.map_err(ApiError::Ingest)?;

    info!(
        "Ingestion of {} finished: {} new, {} skipped",
        summary.last_updated, summary.inserted, summary.skipped
    );
    Ok(Json(MessageResponse::new("Update station successfully!")))
}
