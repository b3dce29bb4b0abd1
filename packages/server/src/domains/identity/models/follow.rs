use sqlx::PgPool;

use crate::common::error::is_fk_violation;
use crate::common::{StoreError, StoreResult, UserId};
use crate::domains::identity::models::User;

/// Directed follow edge set over the `friendships` table.
///
/// Edges are an idempotent set: the composite primary key is the race
/// arbiter, so two concurrent follows of the same pair end up with one
/// row and at most one caller seeing `true`.
pub struct Follow;

impl Follow {
    /// Insert the edge if absent. Returns whether a new edge was created
    /// (`false` = already following).
    pub async fn create(follower: UserId, followed: UserId, pool: &PgPool) -> StoreResult<bool> {
        if follower == followed {
            return Err(StoreError::invalid_argument("cannot follow yourself"));
        }
        let result = sqlx::query(
            "INSERT INTO friendships (follower_id, followed_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(followed)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                StoreError::NotFound("user")
            } else {
                e.into()
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the edge if present. Returns whether a removal occurred;
    /// double-unfollow is a no-op, not an error.
    pub async fn remove(follower: UserId, followed: UserId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM friendships WHERE follower_id = $1 AND followed_id = $2",
        )
        .bind(follower)
        .bind(followed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Is `follower` following `followed`?
    pub async fn exists(follower: UserId, followed: UserId, pool: &PgPool) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM friendships WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower)
        .bind(followed)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Users `user` follows, oldest edge first.
    pub async fn following(user: UserId, pool: &PgPool) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.*
             FROM users u
             JOIN friendships f ON f.followed_id = u.id
             WHERE f.follower_id = $1
             ORDER BY f.created_at ASC, u.id ASC",
        )
        .bind(user)
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    /// Users following `user`, oldest edge first.
    pub async fn followers(user: UserId, pool: &PgPool) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.*
             FROM users u
             JOIN friendships f ON f.follower_id = u.id
             WHERE f.followed_id = $1
             ORDER BY f.created_at ASC, u.id ASC",
        )
        .bind(user)
        .fetch_all(pool)
        .await?;
        Ok(users)
    }
}
