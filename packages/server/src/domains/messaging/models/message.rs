use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::pagination::clamp_limit;
use crate::common::{ChatId, MessageId, StoreError, StoreResult, UserId};
use crate::domains::messaging::models::Chat;

/// Message model - SQL persistence layer
///
/// Messages are totally ordered within a chat by (timestamp, id); the id
/// breaks timestamp ties in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub file_url: Option<String>,
    pub author_id: UserId,
    pub chat_id: ChatId,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Post a message to a chat the author belongs to.
    pub async fn create(
        chat_id: ChatId,
        author_id: UserId,
        content: &str,
        file_url: Option<String>,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        if content.trim().is_empty() {
            return Err(StoreError::invalid_argument("message content must not be empty"));
        }

        // Membership is the only posting right there is. A missing chat is
        // reported as such rather than as a permission problem.
        if !Chat::is_member(chat_id, author_id, pool).await? {
            return match Chat::find_by_id(chat_id, pool).await {
                Ok(_) => Err(StoreError::Forbidden("you are not a member of this chat")),
                Err(err) => Err(err),
            };
        }

        let message = sqlx::query_as::<_, Self>(
            "INSERT INTO messages (content, file_url, author_id, chat_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(content)
        .bind(&file_url)
        .bind(author_id)
        .bind(chat_id)
        .fetch_one(pool)
        .await?;
        Ok(message)
    }

    /// Message history, newest first, optionally restricted to messages
    /// strictly older than `before`. `limit` is clamped server-side.
    pub async fn find_for_chat(
        chat_id: ChatId,
        before: Option<DateTime<Utc>>,
        limit: i64,
        pool: &PgPool,
    ) -> StoreResult<Vec<Self>> {
        let messages = sqlx::query_as::<_, Self>(
            "SELECT * FROM messages
             WHERE chat_id = $1
               AND ($2::timestamptz IS NULL OR timestamp < $2)
             ORDER BY timestamp DESC, id DESC
             LIMIT $3",
        )
        .bind(chat_id)
        .bind(before)
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }

    /// The message with maximum (timestamp, id), if any. A single indexed
    /// lookup, never a scan.
    pub async fn last_for_chat(chat_id: ChatId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let message = sqlx::query_as::<_, Self>(
            "SELECT * FROM messages
             WHERE chat_id = $1
             ORDER BY timestamp DESC, id DESC
             LIMIT 1",
        )
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;
        Ok(message)
    }

    /// Last message per chat for a set of chats, one query (composite-view
    /// building block). Chats without messages are simply absent.
    pub async fn last_for_chats(chat_ids: &[ChatId], pool: &PgPool) -> StoreResult<Vec<Self>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }
        let messages = sqlx::query_as::<_, Self>(
            "SELECT DISTINCT ON (chat_id) *
             FROM messages
             WHERE chat_id = ANY($1)
             ORDER BY chat_id, timestamp DESC, id DESC",
        )
        .bind(chat_ids)
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }
}
