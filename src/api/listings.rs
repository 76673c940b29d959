use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::services::listing::{CreateListingRequest, create_listing, get_listing, get_user_listings};
use crate::utils::error::AppResult;
use crate::utils::helpers::{extract_user_id, json_list, json_response};

async fn create_listing_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateListingRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = extract_user_id(&headers)?;
    let listing = create_listing(&state.db, &user_id, payload).await?;
    Ok(json_response(&listing))
}

async fn get_listing_handler(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let listing = get_listing(&state.db, &listing_id).await?;
    Ok(json_response(&listing))
}

async fn list_own_listings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let user_id = extract_user_id(&headers)?;
    let listings = get_user_listings(&state.db, &user_id).await?;
    Ok(json_list(listings))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(create_listing_handler))
        .route("/mine", get(list_own_listings))
        .route("/:listing_id", get(get_listing_handler))
        .with_state(state)
}
