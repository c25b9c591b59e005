//! HTTP layer - REST routes, handlers and shared state
//!
//! This module exposes the inventory over JSON/HTTP for the browser frontend.
//! Handlers stay thin: they parse requests, call into [`crate::core`] and turn
//! the crate error type into HTTP responses.

/// Login and password change endpoints
pub mod auth;
/// Chemical CRUD, listing and filter endpoints
pub mod chemicals;
/// Error to HTTP response mapping
pub mod error;
/// Extractors with JSON rejections
pub mod extract;
/// Health check
pub mod health;
/// Purchase-order view and reconciliation endpoints
pub mod purchase_orders;

use crate::config::server::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header, request::Parts},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Shared data available to all handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
}

impl ApiState {
    /// Creates a new `ApiState` with the given database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable result
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Builds the application router with CORS and request tracing.
pub fn router(state: ApiState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/chemicals",
            get(chemicals::list_chemicals).post(chemicals::create_chemicals),
        )
        .route(
            "/chemicals/:serial_no",
            get(chemicals::get_chemical)
                .put(chemicals::update_chemical)
                .delete(chemicals::delete_chemical),
        )
        .route("/filter-options", get(chemicals::filter_options))
        .route(
            "/purchase-orders/:po_number",
            get(purchase_orders::get_purchase_order).put(purchase_orders::update_purchase_order),
        )
        .route("/login", post(auth::login))
        .route("/change-password", post(auth::change_password))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server))
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let server = server.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| server.is_origin_allowed(origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
