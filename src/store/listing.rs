use crate::database::DbPool;
use crate::models::listing::Listing;
use crate::utils::error::AppResult;

pub async fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<Listing>> {
    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?;

    Ok(listing)
}

pub async fn find_all_for_owner(pool: &DbPool, owner_id: &str) -> AppResult<Vec<Listing>> {
    let listings = sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE owner_id = ? ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(listings)
}

pub async fn insert(pool: &DbPool, listing: &Listing) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO listings (id, owner_id, title, description, price_cents, thumbnail_url, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&listing.id)
    .bind(&listing.owner_id)
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(listing.price_cents)
    .bind(&listing.thumbnail_url)
    .bind(&listing.status)
    .bind(&listing.created_at)
    .bind(&listing.updated_at)
    .execute(pool.as_ref())
    .await?;

    Ok(())
}
