//! OAuth handshake routes.

use super::types::ApiError;
use super::AppState;
use crate::auth::session::{clear_cookie_value, session_id_from_headers, set_cookie_value};
use crate::error::ConsoleError;
use crate::store::UserRecord;
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::Redirect,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// GET /auth/google - redirect the browser to the identity provider.
pub async fn login(State(state): State<Arc<AppState>>) -> Redirect {
    let oauth_state = state.sessions.issue_state();
    Redirect::to(&state.oauth.authorize_url(&oauth_state))
}

/// GET /auth/google/callback - finish the handshake and open a session.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<(HeaderMap, Redirect), ApiError> {
    if !state.sessions.consume_state(&params.state) {
        return Err(ConsoleError::BadRequest("Invalid OAuth state".into()).into());
    }

    let access_token = state
        .oauth
        .exchange_code(&params.code)
        .await
        .map_err(ConsoleError::from)?;
    let profile = state
        .oauth
        .fetch_profile(&access_token)
        .await
        .map_err(ConsoleError::from)?;

    state
        .store
        .upsert_user(UserRecord {
            owner_id: profile.id.clone(),
            name: profile.name,
            email: profile.email,
            picture: profile.picture,
        })
        .await
        .map_err(ConsoleError::from)?;
    info!(owner = %profile.id, "signed in");

    let session_id = state.sessions.create(profile.id);
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&set_cookie_value(&session_id)) {
        headers.insert(SET_COOKIE, value);
    }
    Ok((headers, Redirect::to("/dashboard")))
}

/// GET /logout - revoke the session and clear its cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (HeaderMap, Redirect) {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.sessions.revoke(&session_id);
    }
    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_cookie_value()) {
        response_headers.insert(SET_COOKIE, value);
    }
    (response_headers, Redirect::to("/"))
}
