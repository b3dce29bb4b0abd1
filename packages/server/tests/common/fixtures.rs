//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.
//! Usernames and emails get a process-unique suffix so tests sharing
//! the database never collide on uniqueness constraints.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use sqlx::PgPool;
use server_core::common::{ChatId, PostId, UserId};
use server_core::domains::content::models::Post;
use server_core::domains::identity::models::{NewUser, User};
use server_core::domains::messaging::models::Chat;

static SEQ: AtomicU64 = AtomicU64::new(0);

/// A process-unique name with the given prefix.
pub fn unique_name(prefix: &str) -> String {
    let n = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, std::process::id(), n)
}

/// Create a regular test user.
pub async fn create_test_user(pool: &PgPool, prefix: &str) -> Result<User> {
    let username = unique_name(prefix);
    let user = User::create(
        NewUser {
            username: username.clone(),
            email: format!("{username}@example.org"),
            hashed_password: "argon2-hash-placeholder".to_string(),
            nickname: None,
            avatar_url: None,
        },
        pool,
    )
    .await?;
    Ok(user)
}

/// Create a test user with the admin flag set.
pub async fn create_test_admin(pool: &PgPool, prefix: &str) -> Result<User> {
    let user = create_test_user(pool, prefix).await?;
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_admin = TRUE WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Create a group chat with the given members (creator included).
pub async fn create_test_group_chat(
    pool: &PgPool,
    creator: UserId,
    members: &[UserId],
) -> Result<ChatId> {
    let chat = Chat::create_group(&unique_name("team"), creator, members, pool).await?;
    Ok(chat.id)
}

/// Create a test post.
pub async fn create_test_post(pool: &PgPool, author: UserId, content: &str) -> Result<PostId> {
    let post = Post::create(author, content, None, pool).await?;
    Ok(post.id)
}
