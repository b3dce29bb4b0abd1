use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::common::{Page, StoreResult, UserId};
use crate::domains::identity::models::User;
use crate::domains::messaging::models::{Chat, Message};

/// A chat as it appears in the chat list: membership plus the newest
/// message for the preview line. Neither field is stored on the chat;
/// both are computed here on every read.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub chat: Chat,
    pub members: Vec<User>,
    pub last_message: Option<Message>,
}

/// The user's chat list with previews.
///
/// Three queries total regardless of how many chats the page holds: the
/// chat page, the memberships for that chat set, and the last message
/// per chat.
pub async fn chat_summaries(
    user_id: UserId,
    page: Page,
    pool: &PgPool,
) -> StoreResult<Vec<ChatSummary>> {
    let chats = Chat::find_for_user(user_id, page, pool).await?;
    let chat_ids: Vec<_> = chats.iter().map(|c| c.id).collect();

    let mut members_by_chat: HashMap<_, Vec<User>> = HashMap::new();
    for (chat_id, user) in Chat::members_for_chats(&chat_ids, pool).await? {
        members_by_chat.entry(chat_id).or_default().push(user);
    }

    let mut last_by_chat: HashMap<_, Message> = HashMap::new();
    for message in Message::last_for_chats(&chat_ids, pool).await? {
        last_by_chat.insert(message.chat_id, message);
    }

    Ok(chats
        .into_iter()
        .map(|chat| {
            let members = members_by_chat.remove(&chat.id).unwrap_or_default();
            let last_message = last_by_chat.remove(&chat.id);
            ChatSummary {
                chat,
                members,
                last_message,
            }
        })
        .collect())
}
