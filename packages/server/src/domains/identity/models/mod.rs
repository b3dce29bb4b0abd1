pub mod follow;
pub mod user;

pub use follow::Follow;
pub use user::{NewUser, ProfilePatch, User};
