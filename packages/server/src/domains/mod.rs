// Business domains
pub mod content;
pub mod identity;
pub mod messaging;
