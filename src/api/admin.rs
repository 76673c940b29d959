use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;
use sqlx::Row;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::conversation::Conversation;
use crate::services::conversation::build_view;
use crate::services::message::get_messages_for_admin;
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_user_id, json_list, to_json};
use crate::utils::permissions::require_admin;

#[derive(Deserialize)]
struct ListParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Oversight listing of every conversation, newest activity first. Views are
/// rendered from the seller's side with no unread perspective.
async fn list_all_conversations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> AppResult<Json<serde_json::Value>> {
    let requester_id = extract_user_id(&headers)?;
    require_admin(&state.db, &requester_id).await?;

    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let total = sqlx::query("SELECT COUNT(*) as count FROM conversations")
        .fetch_one(state.db.as_ref())
        .await?
        .get::<i64, _>("count");

    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations ORDER BY updated_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(state.db.as_ref())
    .await?;

    let mut conversation_list = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        let seller_id = conversation.seller_id.clone();
        let mut view = build_view(&state.db, conversation, &seller_id).await?;
        view.unread_count = 0;
        conversation_list.push(to_json(&view));
    }

    Ok(Json(serde_json::json!({
        "conversations": conversation_list,
        "total": total
    })))
}

/// Moderation read of a conversation's full history. Participant checks are
/// deliberately bypassed; only the admin role gate above protects this path.
async fn list_conversation_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let requester_id = extract_user_id(&headers)?;
    require_admin(&state.db, &requester_id).await?;

    let messages = get_messages_for_admin(&state.db, &conversation_id).await?;
    Ok(json_list(messages))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/conversations", get(list_all_conversations))
        .route(
            "/conversations/:conversation_id/messages",
            get(list_conversation_messages),
        )
        .with_state(state)
}
