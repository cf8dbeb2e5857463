//! Root page.

use super::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde_json::json;
use std::sync::Arc;

/// GET / - signed-in visitors land on the dashboard, everyone else gets
/// the service banner.
pub async fn root(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if state.sessions.owner_from_headers(&headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(json!({
        "service": "tollgate",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "sign_in": "/auth/google",
    }))
    .into_response()
}
