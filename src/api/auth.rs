//! Login and password change.
//!
//! The token returned by `/login` is an opaque session id for the frontend;
//! no route requires it.

use crate::{
    api::{ApiState, MessageResponse, extract::AppJson},
    core::auth,
    errors::{Error, Result},
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

/// Body of `POST /change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// `POST /login`
pub async fn login(
    State(state): State<ApiState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(Error::Validation {
            message: "Please enter both username and password".to_string(),
        });
    }

    let token = auth::login(&state.database, &request.username, &request.password).await?;
    info!(username = %request.username.trim(), "User logged in");
    Ok(Json(LoginResponse {
        success: true,
        token,
        message: "Login successful".to_string(),
    }))
}

/// `POST /change-password`
pub async fn change_password(
    State(state): State<ApiState>,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    auth::change_password(
        &state.database,
        &request.username,
        &request.current_password,
        &request.new_password,
    )
    .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
