//! HTTP API for PGN analysis and chess coaching backed by an AI service.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::clients::SharedAi;
use crate::config::Config;

/// Build the application router around an AI service handle.
pub fn app(ai: SharedAi, config: &Config) -> Router {
    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/analyze", post(routes::analyze::analyze_game))
        .route("/coach", post(routes::coach::coach))
        .route("/analyze-with-voice", post(routes::voice::analyze_with_voice))
        // Shared state
        .layer(Extension(ai))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}
