//! # Console HTTP API
//!
//! HTTP surface of the credit-metered AI console.
//!
//! ## Endpoints
//!
//! - `GET /` - service banner (redirects signed-in users to the dashboard)
//! - `GET /dashboard` - cached account aggregates
//! - `GET /auth/google`, `GET /auth/google/callback`, `GET /logout` - OAuth
//! - `GET /generate-api-key` - issue the session owner's trial key
//! - `POST /create-order`, `POST /verify-payment` - premium upgrade flow
//! - `POST /text|/image|/audio|/music|/video|/genai` - credit-gated
//!   generation routes taking `prompt` and `apiKey` query parameters
//!
//! ## Request flow
//!
//! 1. Session or API-key resolution
//! 2. Credit gate (cache-aside key lookup, reject/disable on exhaustion)
//! 3. Generation dispatch to the external model
//! 4. Optional media-host upload
//! 5. History row + atomic credit decrement
//!
//! All errors share one JSON envelope; see [`types::ApiError`].

mod auth;
mod dashboard;
mod generate;
mod keys;
mod pages;
mod payment;
pub mod types;

pub use types::*;

use crate::auth::{OAuthClient, SessionStore};
use crate::cache::TtlCache;
use crate::config::{StoreBackend, TollgateConfig};
use crate::gate::CreditGate;
use crate::genai::{GenerativeModel, GoogleGenAi};
use crate::media::{CloudinaryHost, MediaHost};
use crate::payment::PaymentGateway;
use crate::store::{LedgerStore, MemoryStore, RestStore};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MB). Generation inputs are query
/// parameters; bodies are small JSON payloads.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state accessible to all handlers.
///
/// Every third-party collaborator is an explicitly constructed client
/// injected here at startup; nothing is process-global.
pub struct AppState {
    pub config: Arc<TollgateConfig>,
    pub store: Arc<dyn LedgerStore>,
    pub cache: Arc<TtlCache>,
    pub gate: CreditGate,
    pub genai: Arc<dyn GenerativeModel>,
    pub media: Arc<dyn MediaHost>,
    pub payments: PaymentGateway,
    pub oauth: OAuthClient,
    pub sessions: SessionStore,
    /// Server startup time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Build application state from configuration and a ledger store.
    ///
    /// The store is taken as an argument so tests can hand in a seeded
    /// [`MemoryStore`]; every other client is constructed from config.
    pub fn new(config: Arc<TollgateConfig>, store: Arc<dyn LedgerStore>) -> Self {
        let http_client = Arc::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.server.request_timeout_seconds))
                .pool_max_idle_per_host(10)
                .build()
                .expect("Failed to create HTTP client"),
        );

        let cache = Arc::new(TtlCache::new());
        let gate = CreditGate::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Duration::from_secs(config.cache.key_ttl_seconds),
        );

        let genai: Arc<dyn GenerativeModel> =
            Arc::new(GoogleGenAi::new(&config.genai, Arc::clone(&http_client)));
        let media: Arc<dyn MediaHost> =
            Arc::new(CloudinaryHost::new(&config.media, Arc::clone(&http_client)));
        let payments = PaymentGateway::new(&config.payment, Arc::clone(&http_client));
        let oauth = OAuthClient::new(&config.oauth, Arc::clone(&http_client));
        let sessions = SessionStore::new(Duration::from_secs(config.oauth.session_ttl_seconds));

        Self {
            config,
            store,
            cache,
            gate,
            genai,
            media,
            payments,
            oauth,
            sessions,
            start_time: Instant::now(),
        }
    }

    /// Build the configured ledger store implementation.
    pub fn build_store(config: &TollgateConfig) -> Arc<dyn LedgerStore> {
        match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Rest => {
                let client = Arc::new(
                    reqwest::Client::builder()
                        .timeout(Duration::from_secs(config.server.request_timeout_seconds))
                        .build()
                        .expect("Failed to create HTTP client"),
                );
                Arc::new(RestStore::new(
                    &config.store.url,
                    &config.store.service_key,
                    client,
                ))
            }
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::root))
        .route("/dashboard", get(dashboard::handle))
        .route("/auth/google", get(auth::login))
        .route("/auth/google/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/generate-api-key", get(keys::handle))
        .route("/create-order", post(payment::create_order))
        .route("/verify-payment", post(payment::verify_payment))
        .route("/text", post(generate::text))
        .route("/image", post(generate::image))
        .route("/audio", post(generate::audio))
        .route("/music", post(generate::music))
        .route("/video", post(generate::video))
        .route("/genai", post(generate::genai))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
