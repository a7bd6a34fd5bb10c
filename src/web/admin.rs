//! Admin login routes and the session extractor

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::request::Parts,
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::routes::json_body;
use super::AppState;
use crate::auth;
use crate::error::{AppError, Result};

/// Proof that the request carried a live admin bearer token
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let token = bearer.token().to_string();
        auth::authorize(&state.db, &token, Utc::now()).await?;
        Ok(Self { token })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// API: exchange the admin password for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let token = auth::login(&state.db, &state.config.admin, request.password.as_deref(), Utc::now()).await?;
    Ok(Json(json!({ "message": "Login successful", "token": token })))
}

/// API: end the presented session
pub async fn logout(State(state): State<Arc<AppState>>, session: AdminSession) -> Result<Json<Value>> {
    auth::logout(&state.db, &session.token).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}
