//! API key issuing.

use super::types::{ApiError, ApiKeyIssued};
use super::AppState;
use crate::error::ConsoleError;
use crate::store::ApiKeyRecord;
use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// GET /generate-api-key - issue a trial key for the session owner.
///
/// At most one key per owner; the check is an existence lookup, not a
/// store-level constraint.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiKeyIssued>, ApiError> {
    let owner_id = state
        .sessions
        .owner_from_headers(&headers)
        .ok_or(ConsoleError::Unauthenticated)?;

    if state
        .store
        .find_key_by_owner(&owner_id)
        .await
        .map_err(ConsoleError::from)?
        .is_some()
    {
        return Err(ConsoleError::KeyExists.into());
    }

    let record = ApiKeyRecord::new_trial(
        owner_id.clone(),
        Uuid::new_v4().to_string(),
        state.config.oauth.trial_credits,
    );
    state
        .store
        .insert_key(record.clone())
        .await
        .map_err(ConsoleError::from)?;
    info!(owner = %owner_id, "issued trial API key");

    Ok(Json(ApiKeyIssued {
        api_key: record.key,
        credits: record.credits,
    }))
}
