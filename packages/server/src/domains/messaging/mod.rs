//! Messaging domain: chats, membership, and messages.

pub mod models;
