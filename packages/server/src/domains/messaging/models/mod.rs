pub mod chat;
pub mod message;

pub use chat::{Chat, ChatWithMembers};
pub use message::Message;
