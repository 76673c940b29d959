use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::database::DbPool;
use crate::services::auth::{LoginRequest, RegisterRequest, login_user, register_user, verify_email};
use crate::utils::error::AppResult;
use crate::utils::jwt::JwtService;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
}

async fn health_check() -> &'static str {
    "OK"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = register_user(&state.db, payload, &state.jwt_service).await?;
    Ok(Json(serde_json::to_value(response).unwrap()))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = login_user(&state.db, payload, &state.jwt_service).await?;
    Ok(Json(serde_json::to_value(response).unwrap()))
}

#[derive(Deserialize)]
struct VerifyEmailRequest {
    email: String,
    code: String,
}

async fn verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> AppResult<Json<serde_json::Value>> {
    verify_email(&state.db, &payload.email, &payload.code).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", post(verify))
        .with_state(state)
}
