use serde::{Deserialize, Serialize};

use crate::database::DbPool;
use crate::models::listing::Listing;
use crate::store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, validate_listing_price, validate_listing_title,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
}

pub async fn create_listing(
    pool: &DbPool,
    owner_id: &str,
    request: CreateListingRequest,
) -> AppResult<Listing> {
    validate_listing_title(&request.title)?;
    validate_listing_price(request.price_cents)?;

    if let Some(description) = &request.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(
                "Description must be at most 2000 characters long".to_string(),
            ));
        }
    }

    let listing = Listing::new(
        owner_id.to_string(),
        request.title.trim().to_string(),
        request.description,
        request.price_cents,
        request.thumbnail_url,
    );

    store::listing::insert(pool, &listing).await?;

    tracing::info!("Listing {} created by user {}", listing.id, owner_id);

    Ok(listing)
}

pub async fn get_listing(pool: &DbPool, listing_id: &str) -> AppResult<Listing> {
    store::listing::find_by_id(pool, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))
}

pub async fn get_user_listings(pool: &DbPool, owner_id: &str) -> AppResult<Vec<Listing>> {
    store::listing::find_all_for_owner(pool, owner_id).await
}
