// Messenger + social network data core
//
// Relational store layer for users, the follow graph, private/group
// chats with messages, and posts with comments and likes. HTTP routing,
// credential handling, and blob storage are external collaborators
// consumed through the traits in `kernel`.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod queries;

pub use config::Config;
