//! Integration tests for posts, comments, and likes.

mod common;

use std::time::Duration;

use crate::common::{create_test_admin, create_test_post, create_test_user, TestHarness};
use server_core::common::{Page, PostId, StoreError};
use server_core::domains::content::models::{Comment, Like, Post};
use test_context::test_context;

// =============================================================================
// Posts
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_and_fetch_post(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let post = Post::create(author.id, "hello world", Some("/img/1.png".to_string()), &ctx.db_pool)
        .await
        .unwrap();

    let fetched = Post::find_by_id(post.id, &ctx.db_pool).await.unwrap();
    assert_eq!(fetched.id, post.id);
    assert_eq!(fetched.content, "hello world");
    assert_eq!(fetched.image_url.as_deref(), Some("/img/1.png"));
    assert_eq!(fetched.author_id, author.id);

    let missing = Post::find_by_id(PostId::from_i64(i64::MAX), &ctx.db_pool).await;
    assert!(matches!(missing, Err(StoreError::NotFound("post"))));
}

/// The feed is newest first. Other tests share the database, so we only
/// assert on the relative order of our own posts.
#[test_context(TestHarness)]
#[tokio::test]
async fn feed_is_newest_first(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "feeder").await.unwrap();

    let older = create_test_post(&ctx.db_pool, author.id, "older").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = create_test_post(&ctx.db_pool, author.id, "newer").await.unwrap();

    let feed = Post::find_feed(Page::first(Page::MAX_LIMIT), &ctx.db_pool)
        .await
        .unwrap();
    let ours: Vec<_> = feed
        .iter()
        .filter(|p| p.author_id == author.id)
        .map(|p| p.id)
        .collect();
    assert_eq!(ours, vec![newer, older]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn author_listing_is_newest_first(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "prolific").await.unwrap();
    let other = create_test_user(&ctx.db_pool, "quiet").await.unwrap();

    let first = create_test_post(&ctx.db_pool, author.id, "first").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = create_test_post(&ctx.db_pool, author.id, "second").await.unwrap();
    create_test_post(&ctx.db_pool, other.id, "unrelated").await.unwrap();

    let posts = Post::find_by_author(author.id, Page::first(10), &ctx.db_pool)
        .await
        .unwrap();
    let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second, first]);
}

/// Deletion is for the author or an admin; anyone else is refused.
#[test_context(TestHarness)]
#[tokio::test]
async fn post_deletion_is_author_or_admin_only(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let stranger = create_test_user(&ctx.db_pool, "stranger").await.unwrap();
    let admin = create_test_admin(&ctx.db_pool, "admin").await.unwrap();

    let own = create_test_post(&ctx.db_pool, author.id, "mine").await.unwrap();
    let denied = Post::delete(own, stranger.id, &ctx.db_pool).await;
    assert!(matches!(denied, Err(StoreError::Forbidden(_))));
    Post::delete(own, author.id, &ctx.db_pool).await.unwrap();

    let moderated = create_test_post(&ctx.db_pool, author.id, "reported").await.unwrap();
    Post::delete(moderated, admin.id, &ctx.db_pool).await.unwrap();

    let missing = Post::delete(PostId::from_i64(i64::MAX), admin.id, &ctx.db_pool).await;
    assert!(matches!(missing, Err(StoreError::NotFound("post"))));
}

/// Deleting a post removes every comment and like hanging off it.
#[test_context(TestHarness)]
#[tokio::test]
async fn post_deletion_cascades_to_engagement(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, author.id, "popular").await.unwrap();

    let mut comment_ids = Vec::new();
    for i in 0..3 {
        let commenter = create_test_user(&ctx.db_pool, "commenter").await.unwrap();
        let comment = Comment::create(post_id, commenter.id, &format!("reply {i}"), &ctx.db_pool)
            .await
            .unwrap();
        comment_ids.push(comment.id);
    }
    for _ in 0..5 {
        let fan = create_test_user(&ctx.db_pool, "fan").await.unwrap();
        Like::create(fan.id, post_id, &ctx.db_pool).await.unwrap();
    }
    assert_eq!(Like::count_for_post(post_id, &ctx.db_pool).await.unwrap(), 5);

    Post::delete(post_id, author.id, &ctx.db_pool).await.unwrap();

    let gone = Post::find_by_id(post_id, &ctx.db_pool).await;
    assert!(matches!(gone, Err(StoreError::NotFound("post"))));
    for comment_id in comment_ids {
        let gone = Comment::find_by_id(comment_id, &ctx.db_pool).await;
        assert!(matches!(gone, Err(StoreError::NotFound("comment"))));
    }
    assert_eq!(Like::count_for_post(post_id, &ctx.db_pool).await.unwrap(), 0);
}

// =============================================================================
// Likes
// =============================================================================

/// Liking twice leaves one edge; only the first call reports a change.
#[test_context(TestHarness)]
#[tokio::test]
async fn like_is_idempotent(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let fan = create_test_user(&ctx.db_pool, "fan").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, author.id, "likeable").await.unwrap();

    assert!(Like::create(fan.id, post_id, &ctx.db_pool).await.unwrap());
    assert!(!Like::create(fan.id, post_id, &ctx.db_pool).await.unwrap());
    assert_eq!(Like::count_for_post(post_id, &ctx.db_pool).await.unwrap(), 1);
    assert!(Like::exists(fan.id, post_id, &ctx.db_pool).await.unwrap());
}

/// Unliking is permissive: removing an absent edge, even on an absent
/// post, quietly reports no change.
#[test_context(TestHarness)]
#[tokio::test]
async fn unlike_is_permissive(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let fan = create_test_user(&ctx.db_pool, "fan").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, author.id, "fickle").await.unwrap();

    Like::create(fan.id, post_id, &ctx.db_pool).await.unwrap();
    assert!(Like::remove(fan.id, post_id, &ctx.db_pool).await.unwrap());
    assert!(!Like::remove(fan.id, post_id, &ctx.db_pool).await.unwrap());
    assert!(!Like::remove(fan.id, PostId::from_i64(i64::MAX), &ctx.db_pool)
        .await
        .unwrap());
}

/// Liking something that does not exist is an error, not a no-op.
#[test_context(TestHarness)]
#[tokio::test]
async fn like_on_missing_post_is_not_found(ctx: &TestHarness) {
    let fan = create_test_user(&ctx.db_pool, "fan").await.unwrap();
    let result = Like::create(fan.id, PostId::from_i64(i64::MAX), &ctx.db_pool).await;
    assert!(matches!(result, Err(StoreError::NotFound("post"))));
}

/// The like count is always the edge cardinality, whatever the
/// like/unlike interleaving was.
#[test_context(TestHarness)]
#[tokio::test]
async fn like_count_matches_edges(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, author.id, "counted").await.unwrap();

    let mut fans = Vec::new();
    for _ in 0..3 {
        fans.push(create_test_user(&ctx.db_pool, "fan").await.unwrap());
    }
    for fan in &fans {
        Like::create(fan.id, post_id, &ctx.db_pool).await.unwrap();
    }
    Like::create(fans[0].id, post_id, &ctx.db_pool).await.unwrap();
    Like::remove(fans[1].id, post_id, &ctx.db_pool).await.unwrap();

    assert_eq!(Like::count_for_post(post_id, &ctx.db_pool).await.unwrap(), 2);

    let mut likers: Vec<_> = Like::likers(post_id, &ctx.db_pool)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    likers.sort();
    let mut expected = vec![fans[0].id, fans[2].id];
    expected.sort();
    assert_eq!(likers, expected);
}

/// Batched counts return an entry per post that has likes.
#[test_context(TestHarness)]
#[tokio::test]
async fn batched_like_counts(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let fan = create_test_user(&ctx.db_pool, "fan").await.unwrap();
    let liked = create_test_post(&ctx.db_pool, author.id, "liked").await.unwrap();
    let ignored = create_test_post(&ctx.db_pool, author.id, "ignored").await.unwrap();
    Like::create(fan.id, liked, &ctx.db_pool).await.unwrap();

    let counts = Like::counts_for_posts(&[liked, ignored], &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(counts, vec![(liked, 1)]);
}

// =============================================================================
// Comments
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn comment_requires_an_existing_post(ctx: &TestHarness) {
    let commenter = create_test_user(&ctx.db_pool, "commenter").await.unwrap();
    let result =
        Comment::create(PostId::from_i64(i64::MAX), commenter.id, "void", &ctx.db_pool).await;
    assert!(matches!(result, Err(StoreError::NotFound("post"))));
}

/// Comments come back oldest first, the reading order of a thread.
#[test_context(TestHarness)]
#[tokio::test]
async fn comments_list_oldest_first(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let commenter = create_test_user(&ctx.db_pool, "commenter").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, author.id, "discussed").await.unwrap();

    let mut made = Vec::new();
    for body in ["first!", "second", "third"] {
        made.push(
            Comment::create(post_id, commenter.id, body, &ctx.db_pool)
                .await
                .unwrap(),
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let listed = Comment::find_for_post(post_id, Page::first(10), &ctx.db_pool)
        .await
        .unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![made[0].id, made[1].id, made[2].id]);
}

/// A comment can be removed by its author, the post's author, or an
/// admin. Nobody else.
#[test_context(TestHarness)]
#[tokio::test]
async fn comment_deletion_rights(ctx: &TestHarness) {
    let post_author = create_test_user(&ctx.db_pool, "host").await.unwrap();
    let commenter = create_test_user(&ctx.db_pool, "guest").await.unwrap();
    let stranger = create_test_user(&ctx.db_pool, "stranger").await.unwrap();
    let admin = create_test_admin(&ctx.db_pool, "admin").await.unwrap();
    let post_id = create_test_post(&ctx.db_pool, post_author.id, "moderated").await.unwrap();

    let by_self = Comment::create(post_id, commenter.id, "one", &ctx.db_pool).await.unwrap();
    let by_host = Comment::create(post_id, commenter.id, "two", &ctx.db_pool).await.unwrap();
    let by_admin = Comment::create(post_id, commenter.id, "three", &ctx.db_pool).await.unwrap();

    let denied = Comment::delete(by_self.id, stranger.id, &ctx.db_pool).await;
    assert!(matches!(denied, Err(StoreError::Forbidden(_))));

    Comment::delete(by_self.id, commenter.id, &ctx.db_pool).await.unwrap();
    Comment::delete(by_host.id, post_author.id, &ctx.db_pool).await.unwrap();
    Comment::delete(by_admin.id, admin.id, &ctx.db_pool).await.unwrap();

    assert!(Comment::find_for_post(post_id, Page::first(10), &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
}
