use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::common::{Page, PostId, StoreError, StoreResult};
use crate::domains::content::models::{Comment, Like, Post};
use crate::domains::identity::models::User;

/// A comment together with its author.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: User,
}

/// A post detail view: post, author, comment thread (each comment with
/// its author), and the like count.
#[derive(Debug, Clone, Serialize)]
pub struct PostEngagement {
    pub post: Post,
    pub author: User,
    pub comments: Vec<CommentWithAuthor>,
    pub like_count: i64,
}

/// Assemble the post detail view in five queries regardless of comment
/// or like volume: post, author, comment page, batched comment authors,
/// like count.
pub async fn post_with_engagement(post_id: PostId, pool: &PgPool) -> StoreResult<PostEngagement> {
    let post = Post::find_by_id(post_id, pool).await?;
    let author = User::find_by_id(post.author_id, pool).await?;

    let comments = Comment::find_for_post(post_id, Page::first(Page::MAX_LIMIT), pool).await?;

    let mut author_ids: Vec<_> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<_, _> = User::find_by_ids(&author_ids, pool)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let comments = comments
        .into_iter()
        .map(|comment| {
            // The FK guarantees the author row exists.
            let author = authors
                .get(&comment.author_id)
                .cloned()
                .ok_or(StoreError::NotFound("user"))?;
            Ok(CommentWithAuthor { comment, author })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    let like_count = Like::count_for_post(post_id, pool).await?;

    Ok(PostEngagement {
        post,
        author,
        comments,
        like_count,
    })
}
