//! Liveness check that also queries the database.

use crate::api::ApiState;
use axum::{Json, extract::State, http::StatusCode};
use sea_orm::ConnectionTrait;
use serde_json::{Value, json};
use tracing::error;

/// `GET /health` - `{ok, database}` when the store answers, 500 otherwise.
pub async fn health_check(State(state): State<ApiState>) -> (StatusCode, Json<Value>) {
    match state.database.ping().await {
        Ok(()) => {
            let backend = format!("{:?}", state.database.get_database_backend()).to_lowercase();
            (StatusCode::OK, Json(json!({ "ok": true, "database": backend })))
        }
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health_reports_database() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send_json(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["database"], "sqlite");
        Ok(())
    }
}
