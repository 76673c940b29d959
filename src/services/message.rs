use crate::database::DbPool;
use crate::models::message::{MessageView, MessageWithSender};
use crate::services::conversation::require_conversation;
use crate::store;
use crate::utils::error::{AppError, AppResult};
use crate::utils::permissions::assert_participant;

/// Append a message as one of the conversation's participants. The
/// conversation's last-activity bump is best-effort: once the message row is
/// committed, a failed touch is logged and the send still succeeds.
pub async fn send_message(
    pool: &DbPool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> AppResult<MessageView> {
    let sender = store::user::find_by_id(pool, sender_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !sender.is_verified() {
        return Err(AppError::Validation(
            "Verification required to send messages".to_string(),
        ));
    }

    let conversation = require_conversation(pool, conversation_id).await?;
    assert_participant(&conversation, sender_id)?;

    let message = store::message::append(pool, conversation_id, sender_id, content).await?;

    if let Err(e) = store::conversation::touch(pool, conversation_id).await {
        tracing::warn!(
            "Failed to refresh last-activity for conversation {}: {}",
            conversation_id,
            e
        );
    }

    tracing::info!(
        "Message sent in conversation {} by user {}",
        conversation_id,
        sender_id
    );

    Ok(MessageView::from_row(
        MessageWithSender {
            message,
            sender_name: sender.name.clone(),
            sender_profile_pic_url: sender.profile_pic_url.clone(),
        },
        Some(sender_id),
    ))
}

/// Full ordered history for a participant. Fetching is the read receipt:
/// everything the other side sent is flipped to read before the list is
/// returned.
pub async fn get_messages(
    pool: &DbPool,
    conversation_id: &str,
    viewer_id: &str,
) -> AppResult<Vec<MessageView>> {
    let conversation = require_conversation(pool, conversation_id).await?;
    assert_participant(&conversation, viewer_id)?;

    store::message::mark_read_for(pool, conversation_id, viewer_id).await?;

    let rows = store::message::list_ordered_with_sender(pool, conversation_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| MessageView::from_row(row, Some(viewer_id)))
        .collect())
}

/// Explicit read-marking for clients that do not want to re-fetch history.
pub async fn mark_as_read(pool: &DbPool, conversation_id: &str, viewer_id: &str) -> AppResult<()> {
    let conversation = require_conversation(pool, conversation_id).await?;
    assert_participant(&conversation, viewer_id)?;

    let flipped = store::message::mark_read_for(pool, conversation_id, viewer_id).await?;

    tracing::debug!(
        "Marked {} messages read in conversation {} for user {}",
        flipped,
        conversation_id,
        viewer_id
    );

    Ok(())
}

pub async fn get_unread_count(
    pool: &DbPool,
    conversation_id: &str,
    viewer_id: &str,
) -> AppResult<i64> {
    let conversation = require_conversation(pool, conversation_id).await?;
    assert_participant(&conversation, viewer_id)?;

    store::message::count_unread_for(pool, conversation_id, viewer_id).await
}

pub async fn get_total_unread_count(pool: &DbPool, user_id: &str) -> AppResult<i64> {
    store::message::count_unread_across_user(pool, user_id).await
}

/// Oversight read of a conversation's history. No participant guard, only an
/// existence check; with no viewer identity every message reports
/// `is_own_message = false`, and nothing is marked read.
pub async fn get_messages_for_admin(
    pool: &DbPool,
    conversation_id: &str,
) -> AppResult<Vec<MessageView>> {
    require_conversation(pool, conversation_id).await?;

    let rows = store::message::list_ordered_with_sender(pool, conversation_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| MessageView::from_row(row, None))
        .collect())
}
