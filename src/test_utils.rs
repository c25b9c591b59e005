//! Shared test utilities for the chemical inventory.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    api::{self, ApiState},
    config::server::ServerConfig,
    core::{
        chemical::{self, ChemicalDraft, ChemicalInput},
        form::FormValue,
    },
    entities,
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use sea_orm::{ConnectOptions, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is limited to one connection: every new connection to
/// `sqlite::memory:` would otherwise open a separate, empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A draft with only a name set.
#[must_use]
pub fn draft_named(name: &str) -> ChemicalDraft {
    ChemicalDraft {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Creates a test chemical with sensible defaults.
///
/// # Defaults
/// * `sku`: 500.0
/// * `quantity`: 2.0 (total 1000)
/// * `consumed`: 100.0
/// * `vendor_name`: "Sigma"
/// * `end_user`: "QC Lab"
pub async fn create_test_chemical(
    db: &DatabaseConnection,
    name: &str,
    po_number: Option<&str>,
) -> Result<entities::chemical::Model> {
    let draft = ChemicalDraft {
        sku: 500.0,
        quantity: 2.0,
        consumed: 100.0,
        vendor_name: Some("Sigma".to_string()),
        end_user: Some("QC Lab".to_string()),
        po_number: po_number.map(str::to_string),
        ..draft_named(name)
    };
    chemical::insert_chemical(db, draft).await
}

/// Builds an unsaved model for pure in-memory tests.
#[must_use]
pub fn chemical_model(serial_no: i64, name: &str) -> entities::chemical::Model {
    entities::chemical::Model {
        serial_no,
        name: name.to_string(),
        sku: 0.0,
        quantity: 0.0,
        total_quantity: 0.0,
        consumed: 0.0,
        actual_stock: 0.0,
        received_on: None,
        end_user: None,
        vendor_name: None,
        po_number: None,
        po_date: None,
        invoice_no: None,
        invoice_date: None,
        invoice_amount: None,
        invoice_submitted_on: None,
        remarks: None,
    }
}

/// Turns a stored row back into what the edit form would submit for it.
#[must_use]
pub fn input_from_model(model: &entities::chemical::Model) -> ChemicalInput {
    ChemicalInput {
        serial_no: Some(FormValue::Text(model.serial_no.to_string())),
        name: Some(model.name.clone()),
        sku: Some(FormValue::Number(model.sku)),
        quantity: Some(FormValue::Number(model.quantity)),
        consumed: Some(FormValue::Number(model.consumed)),
        received_on: model.received_on,
        end_user: model.end_user.clone(),
        vendor_name: model.vendor_name.clone(),
        po_number: model.po_number.clone(),
        po_date: model.po_date,
        invoice_no: model.invoice_no.clone(),
        invoice_date: model.invoice_date,
        invoice_amount: model.invoice_amount.map(FormValue::Number),
        invoice_submitted_on: model.invoice_submitted_on,
        remarks: model.remarks.clone(),
    }
}

/// Builds the HTTP router over a fresh in-memory database.
///
/// The returned connection shares the router's pool, so tests can seed and
/// inspect rows directly.
pub async fn test_app() -> Result<(Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let app = api::router(ApiState::new(db.clone()), &ServerConfig::default());
    Ok((app, db))
}

/// Sends one request through the router and returns the status and JSON body.
///
/// A body that is empty or not JSON comes back as `Value::Null`.
#[allow(clippy::unwrap_used)]
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
