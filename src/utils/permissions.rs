use crate::database::DbPool;
use crate::models::conversation::Conversation;
use crate::utils::error::{AppError, AppResult};
use sqlx::Row;

/// Participant-only gate over an already loaded conversation. Admin
/// oversight never goes through here; it has its own entry points gated by
/// `require_admin` at the API boundary.
pub fn assert_participant(conversation: &Conversation, user_id: &str) -> AppResult<()> {
    if conversation.is_participant(user_id) {
        return Ok(());
    }

    Err(AppError::Forbidden(
        "You are not a participant in this conversation".to_string(),
    ))
}

pub async fn check_admin(pool: &DbPool, user_id: &str) -> AppResult<bool> {
    let role = sqlx::query("SELECT role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool.as_ref())
        .await?
        .get::<String, _>("role");

    Ok(role == "admin")
}

pub async fn require_admin(pool: &DbPool, user_id: &str) -> AppResult<()> {
    if check_admin(pool, user_id).await? {
        return Ok(());
    }

    Err(AppError::Forbidden(
        "Administrator privileges required".to_string(),
    ))
}
