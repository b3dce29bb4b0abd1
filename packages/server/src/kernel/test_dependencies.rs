// TestDependencies - mock implementations for testing
//
// Provides mock collaborators that can be injected into ServerDeps for
// tests. Production implementations live outside this crate.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{BaseBlobStore, BasePrincipalResolver};
use crate::common::{StoreError, UserId};

// =============================================================================
// Static Principal Resolver
// =============================================================================

/// Resolves credentials from a fixed token -> user map.
#[derive(Default)]
pub struct StaticPrincipalResolver {
    principals: HashMap<String, UserId>,
}

impl StaticPrincipalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, credential: &str, user_id: UserId) -> Self {
        self.principals.insert(credential.to_string(), user_id);
        self
    }
}

#[async_trait]
impl BasePrincipalResolver for StaticPrincipalResolver {
    async fn resolve(&self, credential: &str) -> Result<UserId, StoreError> {
        self.principals
            .get(credential)
            .copied()
            .ok_or(StoreError::Unauthenticated)
    }
}

// =============================================================================
// In-Memory Blob Store
// =============================================================================

/// Hands out sequential fake URLs without writing anything anywhere.
#[derive(Default)]
pub struct InMemoryBlobStore {
    counter: AtomicU64,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseBlobStore for InMemoryBlobStore {
    async fn store(&self, _bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let ext = match content_type {
            "image/png" => "png",
            "image/gif" => "gif",
            _ => "jpg",
        };
        Ok(format!("/static/uploads/{n}.{ext}"))
    }
}
