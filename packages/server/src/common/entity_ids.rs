//! Typed ID definitions for all domain entities.
//!
//! One alias per entity table; the association tables (friendships,
//! chat_members, post_likes) are keyed by pairs of these and have no
//! IDs of their own.

// Re-export the core Id type
pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities.
pub struct User;

/// Marker type for Chat entities (private and group).
pub struct Chat;

/// Marker type for Message entities.
pub struct Message;

/// Marker type for Post entities.
pub struct Post;

/// Marker type for Comment entities.
pub struct Comment;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Chat entities.
pub type ChatId = Id<Chat>;

/// Typed ID for Message entities.
pub type MessageId = Id<Message>;

/// Typed ID for Post entities.
pub type PostId = Id<Post>;

/// Typed ID for Comment entities.
pub type CommentId = Id<Comment>;
