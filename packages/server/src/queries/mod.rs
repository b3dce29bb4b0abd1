//! Composite read views.
//!
//! Each function here fans out to the stores with batched queries and
//! merges the results, so callers get fully-shaped views without N+1
//! access patterns. Derived fields (last message, like counts, graph
//! counts) are computed on every read and never persisted.

pub mod chat_summaries;
pub mod post_engagement;
pub mod profile;

pub use chat_summaries::{chat_summaries, ChatSummary};
pub use post_engagement::{post_with_engagement, CommentWithAuthor, PostEngagement};
pub use profile::{feed_with_likes, profile, PostWithLikes, ProfileView};
