use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::error::{is_unique_violation, violated_constraint};
use crate::common::{StoreError, StoreResult, UserId};

/// User model - SQL persistence layer
///
/// `hashed_password` is opaque here; hashing and verification belong to
/// the authentication layer outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial profile update; only present fields are applied
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub hashed_password: Option<String>,
}

impl User {
    /// Insert a new user.
    ///
    /// Fails with `Conflict` when the username or email is already taken;
    /// nickname defaults to the username when absent.
    pub async fn create(new: NewUser, pool: &PgPool) -> StoreResult<Self> {
        let nickname = new.nickname.unwrap_or_else(|| new.username.clone());
        let user = sqlx::query_as::<_, Self>(
            "INSERT INTO users (username, email, hashed_password, nickname, avatar_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.hashed_password)
        .bind(&nickname)
        .bind(&new.avatar_url)
        .fetch_one(pool)
        .await
        .map_err(Self::map_unique)?;

        tracing::debug!(user_id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Find user by username
    pub async fn find_by_username(username: &str, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Find user by email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Batched lookup for composite views. Order is unspecified; callers
    /// stitch by id.
    pub async fn find_by_ids(ids: &[UserId], pool: &PgPool) -> StoreResult<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(users)
    }

    /// Apply a partial profile update.
    ///
    /// Re-validates email uniqueness when the email changes.
    pub async fn update_profile(id: UserId, patch: ProfilePatch, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET email = COALESCE($2, email),
                 nickname = COALESCE($3, nickname),
                 hashed_password = COALESCE($4, hashed_password)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.email)
        .bind(&patch.nickname)
        .bind(&patch.hashed_password)
        .fetch_optional(pool)
        .await
        .map_err(Self::map_unique)?
        .ok_or(StoreError::NotFound("user"))
    }

    /// Update the avatar reference (an opaque blob-store URL).
    pub async fn set_avatar(id: UserId, avatar_url: &str, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>("UPDATE users SET avatar_url = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(avatar_url)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Delete a user. The schema cascades to memberships, messages, posts
    /// (and their comments/likes), comments, and both directions of
    /// follow/like edges.
    pub async fn delete(id: UserId, pool: &PgPool) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        tracing::info!(user_id = %id, "deleted user");
        Ok(())
    }

    fn map_unique(err: sqlx::Error) -> StoreError {
        if is_unique_violation(&err) {
            match violated_constraint(&err).as_deref() {
                Some("users_username_key") => StoreError::conflict("username already taken"),
                Some("users_email_key") => StoreError::conflict("email already registered"),
                _ => StoreError::conflict("user already exists"),
            }
        } else {
            err.into()
        }
    }
}
