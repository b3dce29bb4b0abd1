use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::error::{is_fk_violation, violated_constraint};
use crate::common::{Page, PostId, StoreError, StoreResult, UserId};
use crate::domains::identity::models::User;

/// Post model - SQL persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: UserId,
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Publish a post.
    pub async fn create(
        author_id: UserId,
        content: &str,
        image_url: Option<String>,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let post = sqlx::query_as::<_, Self>(
            "INSERT INTO posts (content, image_url, author_id)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(content)
        .bind(&image_url)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                StoreError::NotFound("user")
            } else {
                StoreError::from(e)
            }
        })?;
        tracing::debug!(post_id = %post.id, author_id = %author_id, "created post");
        Ok(post)
    }

    /// Find post by ID
    pub async fn find_by_id(id: PostId, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("post"))
    }

    /// Global feed, newest first.
    pub async fn find_feed(page: Page, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let posts = sqlx::query_as::<_, Self>(
            "SELECT * FROM posts
             ORDER BY timestamp DESC, id DESC
             OFFSET $1 LIMIT $2",
        )
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(pool)
        .await?;
        Ok(posts)
    }

    /// One author's posts, newest first.
    pub async fn find_by_author(author_id: UserId, page: Page, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let posts = sqlx::query_as::<_, Self>(
            "SELECT * FROM posts
             WHERE author_id = $1
             ORDER BY timestamp DESC, id DESC
             OFFSET $2 LIMIT $3",
        )
        .bind(author_id)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(pool)
        .await?;
        Ok(posts)
    }

    /// Delete a post; only the author or an admin may. Comments and like
    /// edges cascade at the schema level.
    pub async fn delete(post_id: PostId, requester_id: UserId, pool: &PgPool) -> StoreResult<()> {
        let post = Self::find_by_id(post_id, pool).await?;
        if post.author_id != requester_id {
            let requester = User::find_by_id(requester_id, pool).await?;
            if !requester.is_admin {
                return Err(StoreError::Forbidden("not allowed to delete this post"));
            }
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(pool)
            .await?;
        tracing::info!(post_id = %post_id, requester_id = %requester_id, "deleted post");
        Ok(())
    }
}

/// Like edge set over the `post_likes` table.
///
/// Same idempotent-set semantics as the follow graph: the composite
/// primary key arbitrates races, repeats are no-ops.
pub struct Like;

impl Like {
    /// Like a post. Returns whether a new edge was created.
    pub async fn create(user_id: UserId, post_id: PostId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO post_likes (user_id, post_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                match violated_constraint(&e).as_deref() {
                    Some("post_likes_user_id_fkey") => StoreError::NotFound("user"),
                    _ => StoreError::NotFound("post"),
                }
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a like. Permissive on every axis: a missing edge and even a
    /// missing post both come back as `false`, never an error, so client
    /// retries stay idempotent.
    pub async fn remove(user_id: UserId, post_id: PostId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Has the user liked the post?
    pub async fn exists(user_id: UserId, post_id: PostId, pool: &PgPool) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Number of likes on a post, counted over the edge table.
    pub async fn count_for_post(post_id: PostId, pool: &PgPool) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Like counts for a set of posts in one query (composite-view
    /// building block). Posts with zero likes are absent from the result.
    pub async fn counts_for_posts(
        post_ids: &[PostId],
        pool: &PgPool,
    ) -> StoreResult<Vec<(PostId, i64)>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let counts = sqlx::query_as::<_, (PostId, i64)>(
            "SELECT post_id, COUNT(*)
             FROM post_likes
             WHERE post_id = ANY($1)
             GROUP BY post_id",
        )
        .bind(post_ids)
        .fetch_all(pool)
        .await?;
        Ok(counts)
    }

    /// Users who liked a post, for when the caller explicitly needs the
    /// identities rather than the count.
    pub async fn likers(post_id: PostId, pool: &PgPool) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.*
             FROM users u
             JOIN post_likes pl ON pl.user_id = u.id
             WHERE pl.post_id = $1
             ORDER BY u.id ASC",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await?;
        Ok(users)
    }
}
