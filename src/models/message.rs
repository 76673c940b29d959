use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub is_read: i64,
    pub created_at: String,
}

impl Message {
    pub fn new(conversation_id: String, sender_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            sender_id,
            content,
            is_read: 0,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Message joined with its sender's public fields, as loaded from the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageWithSender {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: Message,
    pub sender_name: String,
    pub sender_profile_pic_url: Option<String>,
}

/// Message as returned to a caller. `is_own_message` is relative to the
/// viewer; admin oversight passes no viewer and gets `false` everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub conversation_id: String,
    pub sender: UserSummary,
    pub content: String,
    pub is_read: bool,
    pub is_own_message: bool,
    pub created_at: String,
}

impl MessageView {
    pub fn from_row(row: MessageWithSender, viewer_id: Option<&str>) -> Self {
        let is_own_message = viewer_id.is_some_and(|v| v == row.message.sender_id);
        Self {
            id: row.message.id,
            conversation_id: row.message.conversation_id,
            sender: UserSummary {
                id: row.message.sender_id,
                name: row.sender_name,
                profile_pic_url: row.sender_profile_pic_url,
            },
            content: row.message.content,
            is_read: row.message.is_read == 1,
            is_own_message,
            created_at: row.message.created_at,
        }
    }
}
