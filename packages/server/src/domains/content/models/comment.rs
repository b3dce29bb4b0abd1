use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::error::is_fk_violation;
use crate::common::{CommentId, Page, PostId, StoreError, StoreResult, UserId};
use crate::domains::content::models::Post;
use crate::domains::identity::models::User;

/// Comment model - SQL persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// Comment on a post.
    pub async fn create(
        post_id: PostId,
        author_id: UserId,
        content: &str,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let comment = sqlx::query_as::<_, Self>(
            "INSERT INTO comments (content, author_id, post_id)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(content)
        .bind(author_id)
        .bind(post_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                StoreError::NotFound("post")
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(comment)
    }

    /// Find comment by ID
    pub async fn find_by_id(id: CommentId, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("comment"))
    }

    /// A post's comments, oldest first - comments read chronologically,
    /// unlike posts and messages.
    pub async fn find_for_post(post_id: PostId, page: Page, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let comments = sqlx::query_as::<_, Self>(
            "SELECT * FROM comments
             WHERE post_id = $1
             ORDER BY timestamp ASC, id ASC
             OFFSET $2 LIMIT $3",
        )
        .bind(post_id)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(pool)
        .await?;
        Ok(comments)
    }

    /// Delete a comment. Allowed for the comment author, the parent
    /// post's author, and admins.
    pub async fn delete(comment_id: CommentId, requester_id: UserId, pool: &PgPool) -> StoreResult<()> {
        let comment = Self::find_by_id(comment_id, pool).await?;

        if comment.author_id != requester_id {
            let post = Post::find_by_id(comment.post_id, pool).await?;
            if post.author_id != requester_id {
                let requester = User::find_by_id(requester_id, pool).await?;
                if !requester.is_admin {
                    return Err(StoreError::Forbidden("not allowed to delete this comment"));
                }
            }
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
