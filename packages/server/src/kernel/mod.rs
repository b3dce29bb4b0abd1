//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use test_dependencies::{InMemoryBlobStore, StaticPrincipalResolver};
pub use traits::{BaseBlobStore, BasePrincipalResolver};
