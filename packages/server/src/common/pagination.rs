//! Offset pagination with server-side limit clamping.
//!
//! Every list operation takes a `Page`; callers never get to pick an
//! unbounded limit. Messages additionally use a timestamp cursor for
//! backward pagination (see `Message::find_for_chat`), which composes
//! with the clamped limit here.

/// A validated offset/limit pair.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    /// Hard server-side cap on page size.
    pub const MAX_LIMIT: i64 = 100;

    /// Default page size for message history.
    pub const MESSAGES_DEFAULT: i64 = 50;

    /// Default page size for post feeds.
    pub const POSTS_DEFAULT: i64 = 20;

    /// Build a page from raw caller input, clamping both fields
    /// (limit to 1..=100, offset to >= 0).
    pub fn new(skip: i64, limit: i64) -> Self {
        Page {
            offset: skip.max(0),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// First `limit` items.
    pub fn first(limit: i64) -> Self {
        Self::new(0, limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, 25)
    }
}

/// Clamp a bare limit argument (cursor-paginated queries that take no
/// offset).
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, Page::MAX_LIMIT)
}
