//! Identity domain: users and the directed follow graph.

pub mod models;
