use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
    Removed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Removed => "removed",
        }
    }
}

/// Compact listing projection embedded in conversation payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: String,
    pub title: String,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub status: String,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            price_cents: listing.price_cents,
            thumbnail_url: listing.thumbnail_url.clone(),
            status: listing.status.clone(),
        }
    }
}

impl Listing {
    pub fn new(
        owner_id: String,
        title: String,
        description: Option<String>,
        price_cents: i64,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title,
            description,
            price_cents,
            thumbnail_url,
            status: ListingStatus::Active.as_str().to_string(),
            created_at: Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }
}
