//! Account dashboard aggregates.

use super::types::{ApiError, DashboardView};
use super::AppState;
use crate::cache::dashboard_cache_key;
use crate::error::ConsoleError;
use axum::{extract::State, http::HeaderMap, response::Json};
use std::sync::Arc;
use std::time::Duration;

/// GET /dashboard - user row, key, prompt history and transactions for
/// the session owner, cached briefly to keep page refreshes off the
/// store.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardView>, ApiError> {
    let owner_id = state
        .sessions
        .owner_from_headers(&headers)
        .ok_or(ConsoleError::Unauthenticated)?;

    let cache_key = dashboard_cache_key(&owner_id);
    if let Some(view) = state.cache.get::<DashboardView>(&cache_key) {
        return Ok(Json(view));
    }

    let view = build_view(&state, &owner_id).await?;
    state.cache.put(
        &cache_key,
        &view,
        Duration::from_secs(state.config.cache.dashboard_ttl_seconds),
    );
    Ok(Json(view))
}

async fn build_view(state: &AppState, owner_id: &str) -> Result<DashboardView, ConsoleError> {
    let user = state.store.find_user(owner_id).await?;
    let key = state.store.find_key_by_owner(owner_id).await?;
    let history = match &key {
        Some(record) => state.store.history_for_key(&record.key).await?,
        None => Vec::new(),
    };
    let transactions = state.store.transactions_for_owner(owner_id).await?;

    Ok(DashboardView {
        user,
        key,
        history,
        transactions,
    })
}
