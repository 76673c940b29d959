use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, patch, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::conversation::{
    get_conversation, get_conversations_for_listing, get_or_create_conversation,
    get_user_conversations,
};
use crate::services::message::{
    get_messages, get_total_unread_count, get_unread_count, mark_as_read, send_message,
};
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_user_id, json_list, json_response};

#[derive(Deserialize)]
struct OpenConversationRequest {
    listing_id: String,
}

#[derive(Deserialize)]
struct SendMessageRequest {
    content: String,
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let user_id = extract_user_id(&headers)?;
    let conversations = get_user_conversations(&state.db, &user_id).await?;
    Ok(json_list(conversations))
}

async fn open_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<OpenConversationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let conversation =
        get_or_create_conversation(&state.db, &payload.listing_id, &user_id).await?;
    Ok(json_response(&conversation))
}

async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let conversation = get_conversation(&state.db, &conversation_id, &user_id).await?;
    Ok(json_response(&conversation))
}

async fn list_for_listing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let user_id = extract_user_id(&headers)?;
    let conversations = get_conversations_for_listing(&state.db, &listing_id, &user_id).await?;
    Ok(json_list(conversations))
}

/// Fetching the history doubles as the read receipt for the caller.
async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let user_id = extract_user_id(&headers)?;
    let messages = get_messages(&state.db, &conversation_id, &user_id).await?;
    Ok(json_list(messages))
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let message = send_message(&state.db, &conversation_id, &user_id, &payload.content).await?;
    Ok(json_response(&message))
}

async fn mark_read_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    mark_as_read(&state.db, &conversation_id, &user_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn unread_count_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let count = get_unread_count(&state.db, &conversation_id, &user_id).await?;
    Ok(Json(serde_json::json!({ "unread_count": count })))
}

async fn total_unread_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let count = get_total_unread_count(&state.db, &user_id).await?;
    Ok(Json(serde_json::json!({ "total_unread": count })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_conversations))
        .route("/", post(open_conversation))
        .route("/total-unread", get(total_unread_handler))
        .route("/listing/:listing_id", get(list_for_listing))
        .route("/:conversation_id", get(get_conversation_handler))
        .route("/:conversation_id/messages", get(list_messages))
        .route("/:conversation_id/messages", post(send_message_handler))
        .route("/:conversation_id/read", patch(mark_read_handler))
        .route("/:conversation_id/unread", get(unread_count_handler))
        .with_state(state)
}
