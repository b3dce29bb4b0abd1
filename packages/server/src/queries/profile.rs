use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::common::{Page, StoreResult, UserId};
use crate::domains::content::models::{Like, Post};
use crate::domains::identity::models::{Follow, User};

/// How many of the profile owner's posts ride along with the profile.
const PROFILE_POSTS: i64 = 20;

/// A post together with its computed like count.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithLikes {
    pub post: Post,
    pub like_count: i64,
}

/// A public profile view: the user, their recent posts, and the graph
/// counts. `is_following` is present only when a viewer is.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub posts: Vec<PostWithLikes>,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    pub is_following: Option<bool>,
}

/// Assemble a profile in a fixed number of queries: user lookup, one
/// counts query of scalar subselects, the post page, one batched like
/// count, and (with a viewer) one edge-existence check.
pub async fn profile(
    username: &str,
    viewer_id: Option<UserId>,
    pool: &PgPool,
) -> StoreResult<ProfileView> {
    let user = User::find_by_username(username, pool).await?;

    let (followers_count, following_count, posts_count) = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT
            (SELECT COUNT(*) FROM friendships WHERE followed_id = $1),
            (SELECT COUNT(*) FROM friendships WHERE follower_id = $1),
            (SELECT COUNT(*) FROM posts WHERE author_id = $1)",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    let posts = Post::find_by_author(user.id, Page::first(PROFILE_POSTS), pool).await?;
    let posts = attach_like_counts(posts, pool).await?;

    let is_following = match viewer_id {
        Some(viewer) => Some(Follow::exists(viewer, user.id, pool).await?),
        None => None,
    };

    Ok(ProfileView {
        user,
        posts,
        followers_count,
        following_count,
        posts_count,
        is_following,
    })
}

/// The global feed with like counts, two queries for any page size.
pub async fn feed_with_likes(page: Page, pool: &PgPool) -> StoreResult<Vec<PostWithLikes>> {
    let posts = Post::find_feed(page, pool).await?;
    attach_like_counts(posts, pool).await
}

async fn attach_like_counts(posts: Vec<Post>, pool: &PgPool) -> StoreResult<Vec<PostWithLikes>> {
    let post_ids: Vec<_> = posts.iter().map(|p| p.id).collect();
    let counts: HashMap<_, _> = Like::counts_for_posts(&post_ids, pool)
        .await?
        .into_iter()
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let like_count = counts.get(&post.id).copied().unwrap_or(0);
            PostWithLikes { post, like_count }
        })
        .collect())
}
