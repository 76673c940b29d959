use crate::database::DbPool;
use crate::models::conversation::{Conversation, ConversationView};
use crate::models::listing::ListingSummary;
use crate::models::user::UserSummary;
use crate::store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::permissions::assert_participant;

/// Start a conversation on a listing, or return the one the buyer already
/// has. Creation requires a verified buyer who does not own the listing;
/// concurrent duplicate requests collapse onto the single row behind the
/// (listing, buyer) uniqueness constraint.
pub async fn get_or_create_conversation(
    pool: &DbPool,
    listing_id: &str,
    buyer_id: &str,
) -> AppResult<ConversationView> {
    let buyer = store::user::find_by_id(pool, buyer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !buyer.is_verified() {
        return Err(AppError::Validation(
            "Please verify your email before chatting with sellers".to_string(),
        ));
    }

    let listing = store::listing::find_by_id(pool, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id == buyer_id {
        return Err(AppError::Validation(
            "You cannot start a conversation on your own listing".to_string(),
        ));
    }

    if let Some(existing) = store::conversation::find_by_listing_and_buyer(pool, listing_id, buyer_id).await? {
        return build_view(pool, &existing, buyer_id).await;
    }

    let conversation = store::conversation::create(pool, &listing, buyer_id).await?;

    tracing::info!(
        "Conversation {} created between buyer {} and seller {} for listing {}",
        conversation.id,
        buyer_id,
        listing.owner_id,
        listing_id
    );

    build_view(pool, &conversation, buyer_id).await
}

/// Inbox: every conversation the user participates in, newest activity
/// first, each carrying that user's own unread count.
pub async fn get_user_conversations(
    pool: &DbPool,
    user_id: &str,
) -> AppResult<Vec<ConversationView>> {
    let conversations = store::conversation::find_all_for_user(pool, user_id).await?;

    let mut views = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        views.push(build_view(pool, conversation, user_id).await?);
    }

    Ok(views)
}

pub async fn get_conversation(
    pool: &DbPool,
    conversation_id: &str,
    user_id: &str,
) -> AppResult<ConversationView> {
    let conversation = require_conversation(pool, conversation_id).await?;
    assert_participant(&conversation, user_id)?;
    build_view(pool, &conversation, user_id).await
}

/// Seller-only overview of every inquiry on one listing.
pub async fn get_conversations_for_listing(
    pool: &DbPool,
    listing_id: &str,
    requester_id: &str,
) -> AppResult<Vec<ConversationView>> {
    let listing = store::listing::find_by_id(pool, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != requester_id {
        return Err(AppError::Forbidden(
            "You can only view conversations for your own listings".to_string(),
        ));
    }

    let conversations = store::conversation::find_all_for_listing(pool, listing_id).await?;

    let mut views = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        views.push(build_view(pool, conversation, requester_id).await?);
    }

    Ok(views)
}

pub async fn require_conversation(
    pool: &DbPool,
    conversation_id: &str,
) -> AppResult<Conversation> {
    store::conversation::find_by_id(pool, conversation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))
}

/// Assemble the viewer-relative payload: listing summary, the other
/// participant, latest message preview and the viewer's unread count. Counts
/// are computed fresh on every call, never cached on the row.
pub async fn build_view(
    pool: &DbPool,
    conversation: &Conversation,
    viewer_id: &str,
) -> AppResult<ConversationView> {
    let listing = store::listing::find_by_id(pool, &conversation.listing_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Conversation {} references missing listing",
                conversation.id
            ))
        })?;

    let other_id = conversation.other_participant_id(viewer_id);
    let other = store::user::find_by_id(pool, other_id).await?.ok_or_else(|| {
        AppError::Internal(format!(
            "Conversation {} references missing user",
            conversation.id
        ))
    })?;

    let last = store::message::find_last(pool, &conversation.id).await?;
    let unread_count = store::message::count_unread_for(pool, &conversation.id, viewer_id).await?;

    Ok(ConversationView {
        id: conversation.id.clone(),
        listing: ListingSummary::from(&listing),
        other_participant: UserSummary::from(&other),
        last_message: last.as_ref().map(|m| m.content.clone()),
        last_message_at: last.map(|m| m.created_at),
        unread_count,
        is_buyer: conversation.buyer_id == viewer_id,
        is_seller: conversation.seller_id == viewer_id,
        created_at: conversation.created_at.clone(),
        updated_at: conversation.updated_at.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_listing, insert_user, test_pool};

    #[tokio::test]
    async fn open_twice_returns_the_same_conversation() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Microwave").await;

        let first = get_or_create_conversation(&pool, &listing.id, &buyer.id)
            .await
            .unwrap();
        let second = get_or_create_conversation(&pool, &listing.id, &buyer.id)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.unread_count, 0);
        assert!(first.is_buyer);
        assert!(!first.is_seller);
        assert_eq!(first.other_participant.id, seller.id);
    }

    #[tokio::test]
    async fn unverified_buyer_cannot_open_conversation() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", false).await;
        let listing = insert_listing(&pool, &seller.id, "Printer").await;

        let err = get_or_create_conversation(&pool, &listing.id, &buyer.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn owner_cannot_message_their_own_listing() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Headphones").await;

        let err = get_or_create_conversation(&pool, &listing.id, &seller.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_user_and_listing_are_not_found() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Blender").await;

        let err = get_or_create_conversation(&pool, &listing.id, "no-such-user")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = get_or_create_conversation(&pool, "no-such-listing", &buyer.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_overview_is_seller_only() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer_a = insert_user(&pool, "a@campus.edu", true).await;
        let buyer_b = insert_user(&pool, "b@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Futon").await;

        get_or_create_conversation(&pool, &listing.id, &buyer_a.id)
            .await
            .unwrap();
        get_or_create_conversation(&pool, &listing.id, &buyer_b.id)
            .await
            .unwrap();

        let views = get_conversations_for_listing(&pool, &listing.id, &seller.id)
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.is_seller));

        // A participant-buyer still cannot use the seller overview.
        let err = get_conversations_for_listing(&pool, &listing.id, &buyer_a.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn get_conversation_guards_non_participants() {
        let pool = test_pool().await;
        let seller = insert_user(&pool, "seller@campus.edu", true).await;
        let buyer = insert_user(&pool, "buyer@campus.edu", true).await;
        let outsider = insert_user(&pool, "outsider@campus.edu", true).await;
        let listing = insert_listing(&pool, &seller.id, "Lamp").await;

        let view = get_or_create_conversation(&pool, &listing.id, &buyer.id)
            .await
            .unwrap();

        assert!(get_conversation(&pool, &view.id, &seller.id).await.is_ok());

        let err = get_conversation(&pool, &view.id, &outsider.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
