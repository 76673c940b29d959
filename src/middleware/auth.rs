use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sqlx::Row;
use std::sync::Arc;

use crate::api::AppState;
use crate::utils::error::AppError;

pub const AUTH_USER_ID_HEADER: &str = "x-user-id";

/// Resolves the bearer token to a user id and forwards it to handlers via a
/// request header. Blocked or deleted accounts are rejected here, before any
/// handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("Missing or invalid authorization header".to_string()))?;

    let user_id = state.jwt_service.extract_user_id(token)?;

    let row = sqlx::query("SELECT blocked FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(state.db.as_ref())
        .await
        .map_err(|_| AppError::Internal("Database error during auth check".to_string()))?
        .ok_or_else(|| AppError::Auth("User no longer exists".to_string()))?;

    if row.get::<i64, _>("blocked") == 1 {
        return Err(AppError::Auth("Account is blocked".to_string()));
    }

    request.headers_mut().insert(
        AUTH_USER_ID_HEADER,
        user_id
            .parse()
            .map_err(|_| AppError::Internal("Failed to set user id header".to_string()))?,
    );

    Ok(next.run(request).await)
}
