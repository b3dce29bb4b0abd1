//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to the calling layer. The store
//! models themselves only need the pool; the collaborator traits ride
//! along so request handlers can resolve principals and store uploads
//! without reaching around the container.

use sqlx::PgPool;
use std::sync::Arc;

use super::{BaseBlobStore, BasePrincipalResolver};

/// Server dependencies accessible to request handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Authentication seam: credential -> user id
    pub principal_resolver: Arc<dyn BasePrincipalResolver>,
    /// Media seam: bytes -> opaque URL
    pub blob_store: Arc<dyn BaseBlobStore>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        principal_resolver: Arc<dyn BasePrincipalResolver>,
        blob_store: Arc<dyn BaseBlobStore>,
    ) -> Self {
        Self {
            db_pool,
            principal_resolver,
            blob_store,
        }
    }

    pub fn db_pool(&self) -> &PgPool {
        &self.db_pool
    }
}
