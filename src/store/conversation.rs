use chrono::Utc;

use crate::database::DbPool;
use crate::models::conversation::Conversation;
use crate::models::listing::Listing;
use crate::utils::error::{AppError, AppResult};

pub async fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<Conversation>> {
    let conversation =
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool.as_ref())
            .await?;

    Ok(conversation)
}

pub async fn find_by_listing_and_buyer(
    pool: &DbPool,
    listing_id: &str,
    buyer_id: &str,
) -> AppResult<Option<Conversation>> {
    let conversation = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE listing_id = ? AND buyer_id = ?",
    )
    .bind(listing_id)
    .bind(buyer_id)
    .fetch_optional(pool.as_ref())
    .await?;

    Ok(conversation)
}

pub async fn find_all_for_user(pool: &DbPool, user_id: &str) -> AppResult<Vec<Conversation>> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE buyer_id = ? OR seller_id = ? ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(conversations)
}

pub async fn find_all_for_listing(pool: &DbPool, listing_id: &str) -> AppResult<Vec<Conversation>> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE listing_id = ? ORDER BY updated_at DESC",
    )
    .bind(listing_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(conversations)
}

/// Insert-or-fetch under the UNIQUE(listing_id, buyer_id) index. Two racing
/// requests for the same pair both end up with the single surviving row; the
/// constraint is the synchronization point, not a pre-check.
pub async fn create(pool: &DbPool, listing: &Listing, buyer_id: &str) -> AppResult<Conversation> {
    let conversation = Conversation::new(
        listing.id.clone(),
        buyer_id.to_string(),
        listing.owner_id.clone(),
    );

    let inserted = sqlx::query(
        "INSERT INTO conversations (id, listing_id, buyer_id, seller_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&conversation.id)
    .bind(&conversation.listing_id)
    .bind(&conversation.buyer_id)
    .bind(&conversation.seller_id)
    .bind(&conversation.created_at)
    .bind(&conversation.updated_at)
    .execute(pool.as_ref())
    .await;

    match inserted {
        Ok(_) => Ok(conversation),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            match find_by_listing_and_buyer(pool, &listing.id, buyer_id).await? {
                Some(existing) => Ok(existing),
                None => Err(AppError::Conflict(
                    "Conversation already exists for this listing".to_string(),
                )),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Refresh last-activity. Callers treat failure as non-fatal once the
/// triggering message is committed.
pub async fn touch(pool: &DbPool, conversation_id: &str) -> AppResult<()> {
    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(conversation_id)
        .execute(pool.as_ref())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_listing, insert_user, test_pool};

    #[tokio::test]
    async fn create_returns_existing_row_on_duplicate_pair() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Desk lamp").await;

        let first = create(&pool, &listing, &buyer.id).await.unwrap();
        let second = create(&pool, &listing, &buyer.id).await.unwrap();

        assert_eq!(first.id, second.id);

        let all = find_all_for_listing(&pool, &listing.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn different_buyers_get_separate_conversations() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer_a = insert_user(&pool, "a@campus.edu", true).await;
        let buyer_b = insert_user(&pool, "b@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Bike").await;

        let conv_a = create(&pool, &listing, &buyer_a.id).await.unwrap();
        let conv_b = create(&pool, &listing, &buyer_b.id).await.unwrap();

        assert_ne!(conv_a.id, conv_b.id);
        assert_eq!(conv_a.seller_id, seller.id);
        assert_eq!(conv_b.seller_id, seller.id);
    }

    #[tokio::test]
    async fn inbox_orders_by_last_activity_desc() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing_a = insert_listing(&pool, &seller.id, "Textbook").await;
        let listing_b = insert_listing(&pool, &seller.id, "Monitor").await;

        let conv_a = create(&pool, &listing_a, &buyer.id).await.unwrap();
        let conv_b = create(&pool, &listing_b, &buyer.id).await.unwrap();

        // Push conv_a's updated_at past conv_b's.
        sqlx::query("UPDATE conversations SET updated_at = '2099-01-01T00:00:00+00:00' WHERE id = ?")
            .bind(&conv_a.id)
            .execute(pool.as_ref())
            .await
            .unwrap();

        let inbox = find_all_for_user(&pool, &buyer.id).await.unwrap();
        assert_eq!(inbox[0].id, conv_a.id);
        assert_eq!(inbox[1].id, conv_b.id);
    }
}
