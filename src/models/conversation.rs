use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::listing::ListingSummary;
use crate::models::user::UserSummary;

/// One row per (listing, buyer) pair. The seller is denormalized from the
/// listing owner at creation time and never re-derived afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn new(listing_id: String, buyer_id: String, seller_id: String) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            listing_id,
            buyer_id,
            seller_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// The participant that is not `user_id`. Callers must have verified
    /// participation first.
    pub fn other_participant_id(&self, user_id: &str) -> &str {
        if self.buyer_id == user_id {
            &self.seller_id
        } else {
            &self.buyer_id
        }
    }
}

/// Conversation as seen by one participant: the listing, the other party,
/// a preview of the latest message and the viewer's own unread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    pub id: String,
    pub listing: ListingSummary,
    pub other_participant: UserSummary,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub unread_count: i64,
    pub is_buyer: bool,
    pub is_seller: bool,
    pub created_at: String,
    pub updated_at: String,
}
