//! Content domain: posts, comments, and the like graph.

pub mod models;
