use sqlx::Row;

use crate::database::DbPool;
use crate::models::message::{Message, MessageWithSender};
use crate::utils::error::AppResult;
use crate::utils::validation::validate_message_content;

/// Append a message to the conversation's log. Content is stored trimmed;
/// validation happens before any write so a rejected append leaves nothing
/// behind.
pub async fn append(
    pool: &DbPool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> AppResult<Message> {
    let content = content.trim();
    validate_message_content(content)?;

    let message = Message::new(
        conversation_id.to_string(),
        sender_id.to_string(),
        content.to_string(),
    );

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, content, is_read, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(message.is_read)
    .bind(&message.created_at)
    .execute(pool.as_ref())
    .await?;

    Ok(message)
}

/// Full history, ascending by creation time. Ties broken by id so repeated
/// reads return the same order.
pub async fn list_ordered(pool: &DbPool, conversation_id: &str) -> AppResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

pub async fn list_ordered_with_sender(
    pool: &DbPool,
    conversation_id: &str,
) -> AppResult<Vec<MessageWithSender>> {
    let messages = sqlx::query_as::<_, MessageWithSender>(
        "SELECT m.*, u.name as sender_name, u.profile_pic_url as sender_profile_pic_url
         FROM messages m
         JOIN users u ON m.sender_id = u.id
         WHERE m.conversation_id = ?
         ORDER BY m.created_at ASC, m.id ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

pub async fn find_last(pool: &DbPool, conversation_id: &str) -> AppResult<Option<Message>> {
    let message = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(conversation_id)
    .fetch_optional(pool.as_ref())
    .await?;

    Ok(message)
}

/// Unread is viewer-relative: messages the other side sent that nobody has
/// read yet. A viewer's own messages never count.
pub async fn count_unread_for(
    pool: &DbPool,
    conversation_id: &str,
    viewer_id: &str,
) -> AppResult<i64> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM messages
         WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
    )
    .bind(conversation_id)
    .bind(viewer_id)
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count)
}

/// Bulk read-marking for everything the other participant sent. Idempotent;
/// a message appended concurrently may stay unread until the next fetch.
pub async fn mark_read_for(
    pool: &DbPool,
    conversation_id: &str,
    viewer_id: &str,
) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE messages SET is_read = 1
         WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
    )
    .bind(conversation_id)
    .bind(viewer_id)
    .execute(pool.as_ref())
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_unread_across_user(pool: &DbPool, user_id: &str) -> AppResult<i64> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM messages m
         JOIN conversations c ON m.conversation_id = c.id
         WHERE (c.buyer_id = ? OR c.seller_id = ?)
           AND m.sender_id != ?
           AND m.is_read = 0",
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conversation;
    use crate::test_support::{insert_listing, insert_user, test_pool};
    use crate::utils::error::AppError;

    #[tokio::test]
    async fn append_trims_and_rejects_empty_content() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Couch").await;
        let conv = conversation::create(&pool, &listing, &buyer.id)
            .await
            .unwrap();

        let msg = append(&pool, &conv.id, &buyer.id, "  hello  ").await.unwrap();
        assert_eq!(msg.content, "hello");

        let err = append(&pool, &conv.id, &buyer.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let oversized = "x".repeat(2001);
        let err = append(&pool, &conv.id, &buyer.id, &oversized)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unread_counts_are_viewer_relative() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Kettle").await;
        let conv = conversation::create(&pool, &listing, &buyer.id)
            .await
            .unwrap();

        append(&pool, &conv.id, &seller.id, "Is this available?")
            .await
            .unwrap();
        append(&pool, &conv.id, &seller.id, "Still interested?")
            .await
            .unwrap();
        append(&pool, &conv.id, &buyer.id, "Yes!").await.unwrap();

        assert_eq!(count_unread_for(&pool, &conv.id, &buyer.id).await.unwrap(), 2);
        assert_eq!(count_unread_for(&pool, &conv.id, &seller.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_and_scoped_to_other_sender() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Skates").await;
        let conv = conversation::create(&pool, &listing, &buyer.id)
            .await
            .unwrap();

        append(&pool, &conv.id, &seller.id, "hi").await.unwrap();
        append(&pool, &conv.id, &buyer.id, "hey").await.unwrap();

        let flipped = mark_read_for(&pool, &conv.id, &buyer.id).await.unwrap();
        assert_eq!(flipped, 1);
        assert_eq!(count_unread_for(&pool, &conv.id, &buyer.id).await.unwrap(), 0);

        // Buyer's own message is still unread from the seller's side.
        assert_eq!(count_unread_for(&pool, &conv.id, &seller.id).await.unwrap(), 1);

        let flipped_again = mark_read_for(&pool, &conv.id, &buyer.id).await.unwrap();
        assert_eq!(flipped_again, 0);
    }

    #[tokio::test]
    async fn list_ordered_is_ascending_and_stable() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Guitar").await;
        let conv = conversation::create(&pool, &listing, &buyer.id)
            .await
            .unwrap();

        for i in 0..5 {
            append(&pool, &conv.id, &buyer.id, &format!("message {}", i))
                .await
                .unwrap();
        }

        let first = list_ordered(&pool, &conv.id).await.unwrap();
        let second = list_ordered(&pool, &conv.id).await.unwrap();

        assert_eq!(first.len(), 5);
        for window in first.windows(2) {
            assert!(window[0].created_at <= window[1].created_at);
        }

        let first_ids: Vec<_> = first.iter().map(|m| &m.id).collect();
        let second_ids: Vec<_> = second.iter().map(|m| &m.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn total_unread_sums_over_all_conversations() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing_a = insert_listing(&pool, &seller.id, "Chair").await;
        let listing_b = insert_listing(&pool, &seller.id, "Table").await;

        let conv_a = conversation::create(&pool, &listing_a, &buyer.id)
            .await
            .unwrap();
        let conv_b = conversation::create(&pool, &listing_b, &buyer.id)
            .await
            .unwrap();

        append(&pool, &conv_a.id, &seller.id, "one").await.unwrap();
        append(&pool, &conv_b.id, &seller.id, "two").await.unwrap();
        append(&pool, &conv_b.id, &seller.id, "three").await.unwrap();
        append(&pool, &conv_b.id, &buyer.id, "reply").await.unwrap();

        let per_conv = count_unread_for(&pool, &conv_a.id, &buyer.id).await.unwrap()
            + count_unread_for(&pool, &conv_b.id, &buyer.id).await.unwrap();
        let total = count_unread_across_user(&pool, &buyer.id).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(total, per_conv);

        // The seller sees only the buyer's reply.
        assert_eq!(count_unread_across_user(&pool, &seller.id).await.unwrap(), 1);
    }
}
