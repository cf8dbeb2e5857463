//! Tollgate - credit-metered AI API console
//!
//! This library provides the core functionality for the Tollgate service:
//! OAuth onboarding, metered API keys, credit-gated proxying of generative
//! model endpoints (text, image, audio/TTS, music, video), and a payment
//! flow that tops up credit balances.

pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod genai;
pub mod media;
pub mod payment;
pub mod signing;
pub mod store;
