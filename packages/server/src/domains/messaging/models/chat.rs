use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::error::{is_fk_violation, is_unique_violation};
use crate::common::{ChatId, Page, StoreError, StoreResult, UserId};
use crate::domains::identity::models::User;

// The pair columns are storage-internal (they back the one-private-chat-
// per-pair unique index), so chat queries always name the public columns
// instead of SELECT *.
const CHAT_COLS: &str = "id, name, is_private, created_at";

/// Chat model - SQL persistence layer
///
/// A chat is either private (exactly two members, fixed at creation) or
/// a named group. Membership is the only access control there is.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chat {
    pub id: ChatId,
    pub name: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

/// A chat with its membership populated. Messages are deliberately
/// excluded; they are a separate, paginated concern.
#[derive(Debug, Clone, Serialize)]
pub struct ChatWithMembers {
    pub chat: Chat,
    pub members: Vec<User>,
}

impl Chat {
    /// Get the private chat for an unordered user pair, creating it if it
    /// does not exist yet. Deterministic regardless of argument order.
    ///
    /// The existence check and the insert run in one transaction; when a
    /// racing caller wins the unique index on the normalized pair, the
    /// lookup is retried once instead of surfacing the violation.
    pub async fn get_or_create_private(a: UserId, b: UserId, pool: &PgPool) -> StoreResult<Self> {
        if a == b {
            return Err(StoreError::invalid_argument("cannot open a chat with yourself"));
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        if let Some(chat) = Self::find_private_pair(lo, hi, pool).await? {
            return Ok(chat);
        }

        match Self::insert_private(lo, hi, pool).await {
            Ok(chat) => {
                tracing::debug!(chat_id = %chat.id, "created private chat");
                Ok(chat)
            }
            Err(err) if is_unique_violation(&err) => Self::find_private_pair(lo, hi, pool)
                .await?
                .ok_or(StoreError::NotFound("chat")),
            Err(err) if is_fk_violation(&err) => Err(StoreError::NotFound("user")),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_private_pair(lo: UserId, hi: UserId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let chat = sqlx::query_as::<_, Self>(&format!(
            "SELECT {CHAT_COLS} FROM chats
             WHERE is_private AND private_pair_lo = $1 AND private_pair_hi = $2",
        ))
        .bind(lo)
        .bind(hi)
        .fetch_optional(pool)
        .await?;
        Ok(chat)
    }

    async fn insert_private(lo: UserId, hi: UserId, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let chat = sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO chats (is_private, private_pair_lo, private_pair_hi)
             VALUES (TRUE, $1, $2)
             RETURNING {CHAT_COLS}",
        ))
        .bind(lo)
        .bind(hi)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO chat_members (chat_id, user_id) VALUES ($1, $2), ($1, $3)")
            .bind(chat.id)
            .bind(lo)
            .bind(hi)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(chat)
    }

    /// Create a group chat with the creator auto-enrolled.
    ///
    /// The member list is de-duplicated and ids that resolve to no user
    /// are silently skipped; the creator's membership alone is mandatory.
    pub async fn create_group(
        name: &str,
        creator: UserId,
        member_ids: &[UserId],
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid_argument("group chat name is required"));
        }

        let mut tx = pool.begin().await?;
        let chat = sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO chats (name, is_private) VALUES ($1, FALSE) RETURNING {CHAT_COLS}",
        ))
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO chat_members (chat_id, user_id) VALUES ($1, $2)")
            .bind(chat.id)
            .bind(creator)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_fk_violation(&e) {
                    StoreError::NotFound("user")
                } else {
                    StoreError::from(e)
                }
            })?;

        // Unknown ids drop out of the join; the creator is already in.
        sqlx::query(
            "INSERT INTO chat_members (chat_id, user_id)
             SELECT $1, u.id FROM users u WHERE u.id = ANY($2)
             ON CONFLICT DO NOTHING",
        )
        .bind(chat.id)
        .bind(member_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(chat_id = %chat.id, name, "created group chat");
        Ok(chat)
    }

    /// Add a member to a group chat. No-op when already a member.
    ///
    /// Private chats are membership-immutable, regardless of who asks.
    pub async fn add_member(chat_id: ChatId, user_id: UserId, pool: &PgPool) -> StoreResult<()> {
        let chat = Self::find_row(chat_id, pool)
            .await?
            .ok_or(StoreError::NotFound("chat"))?;
        if chat.is_private {
            return Err(StoreError::InvalidOperation(
                "cannot add members to a private chat",
            ));
        }

        sqlx::query(
            "INSERT INTO chat_members (chat_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(chat_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                StoreError::NotFound("user")
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(())
    }

    /// Find a chat with memberships populated.
    pub async fn find_by_id(chat_id: ChatId, pool: &PgPool) -> StoreResult<ChatWithMembers> {
        let chat = Self::find_row(chat_id, pool)
            .await?
            .ok_or(StoreError::NotFound("chat"))?;
        let members = Self::members(chat_id, pool).await?;
        Ok(ChatWithMembers { chat, members })
    }

    async fn find_row(chat_id: ChatId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let chat =
            sqlx::query_as::<_, Self>(&format!("SELECT {CHAT_COLS} FROM chats WHERE id = $1"))
                .bind(chat_id)
                .fetch_optional(pool)
                .await?;
        Ok(chat)
    }

    /// Members of one chat.
    pub async fn members(chat_id: ChatId, pool: &PgPool) -> StoreResult<Vec<User>> {
        let members = sqlx::query_as::<_, User>(
            "SELECT u.*
             FROM users u
             JOIN chat_members cm ON cm.user_id = u.id
             WHERE cm.chat_id = $1
             ORDER BY u.id ASC",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }

    /// Members for a set of chats in one query (composite-view building
    /// block).
    pub async fn members_for_chats(
        chat_ids: &[ChatId],
        pool: &PgPool,
    ) -> StoreResult<Vec<(ChatId, User)>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ChatMemberRow>(
            "SELECT cm.chat_id, u.*
             FROM users u
             JOIN chat_members cm ON cm.user_id = u.id
             WHERE cm.chat_id = ANY($1)
             ORDER BY cm.chat_id ASC, u.id ASC",
        )
        .bind(chat_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.chat_id, r.user)).collect())
    }

    /// Is the user a member of the chat?
    pub async fn is_member(chat_id: ChatId, user_id: UserId, pool: &PgPool) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chat_members WHERE chat_id = $1 AND user_id = $2)",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Chats the user belongs to, newest chat first.
    ///
    /// Ordered by chat creation time, not last activity.
    pub async fn find_for_user(user_id: UserId, page: Page, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let chats = sqlx::query_as::<_, Self>(
            "SELECT c.id, c.name, c.is_private, c.created_at
             FROM chats c
             JOIN chat_members cm ON cm.chat_id = c.id
             WHERE cm.user_id = $1
             ORDER BY c.created_at DESC, c.id DESC
             OFFSET $2 LIMIT $3",
        )
        .bind(user_id)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(pool)
        .await?;
        Ok(chats)
    }

    /// Delete a chat; memberships and messages cascade at the schema level.
    pub async fn delete(chat_id: ChatId, pool: &PgPool) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(chat_id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("chat"));
        }
        tracing::info!(chat_id = %chat_id, "deleted chat");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ChatMemberRow {
    chat_id: ChatId,
    #[sqlx(flatten)]
    user: User,
}
