//! Premium upgrade flow: order creation and callback verification.

use super::types::{ApiError, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse};
use super::AppState;
use crate::cache::{api_key_cache_key, dashboard_cache_key};
use crate::error::ConsoleError;
use crate::store::{Plan, TransactionEntry};
use axum::{extract::State, http::HeaderMap, response::Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// POST /create-order - open a gateway order for the premium upgrade.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let owner_id = state
        .sessions
        .owner_from_headers(&headers)
        .ok_or(ConsoleError::Unauthenticated)?;

    if let Some(record) = state
        .store
        .find_key_by_owner(&owner_id)
        .await
        .map_err(ConsoleError::from)?
    {
        if record.plan == Plan::Premium {
            return Err(ConsoleError::AlreadyPremium.into());
        }
    }

    let user = state
        .store
        .find_user(&owner_id)
        .await
        .map_err(ConsoleError::from)?;
    let email = user.as_ref().map(|u| u.email.as_str());

    let order = state
        .payments
        .create_order(&owner_id, email)
        .await
        .map_err(ConsoleError::from)?;
    info!(owner = %owner_id, order = %order.id, "created upgrade order");

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: state.payments.key_id().to_string(),
    }))
}

/// POST /verify-payment - validate the gateway callback signature and
/// apply the upgrade.
///
/// A bad signature answers `{"success": false}` with HTTP 200; the
/// checkout page treats it as a failed payment, not a transport error.
/// Replayed callbacks for an already-recorded payment are acknowledged
/// without applying the upgrade twice.
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    if !state
        .payments
        .verify_signature(&request.order_id, &request.payment_id, &request.signature)
    {
        warn!(order = %request.order_id, "payment signature mismatch");
        return Ok(Json(VerifyPaymentResponse { success: false }));
    }

    let payment = state
        .payments
        .fetch_payment(&request.payment_id)
        .await
        .map_err(ConsoleError::from)?;
    let owner_id = payment.notes.owner_id.clone();
    if owner_id.is_empty() {
        return Err(ConsoleError::BadRequest("Payment carries no account".into()).into());
    }

    if state
        .store
        .transaction_exists(&payment.id)
        .await
        .map_err(ConsoleError::from)?
    {
        info!(payment = %payment.id, "replayed payment callback, already recorded");
        return Ok(Json(VerifyPaymentResponse { success: true }));
    }

    state
        .store
        .upgrade_plan(&owner_id, state.config.payment.premium_credits)
        .await
        .map_err(ConsoleError::from)?;
    state
        .store
        .append_transaction(TransactionEntry {
            transaction_id: payment.id.clone(),
            owner_id: owner_id.clone(),
            timestamp: Utc::now(),
            status: payment.status.clone(),
        })
        .await
        .map_err(ConsoleError::from)?;

    // Drop cached views that now understate the balance.
    state.cache.remove(&dashboard_cache_key(&owner_id));
    if let Some(record) = state
        .store
        .find_key_by_owner(&owner_id)
        .await
        .map_err(ConsoleError::from)?
    {
        state.cache.remove(&api_key_cache_key(&record.key));
    }

    info!(owner = %owner_id, payment = %payment.id, "premium upgrade applied");
    Ok(Json(VerifyPaymentResponse { success: true }))
}
