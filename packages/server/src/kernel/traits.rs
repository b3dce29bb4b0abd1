// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - the store layer consumes them,
// it never implements them. Real implementations (JWT verification,
// object storage) belong to the calling layer.
//
// Naming convention: Base* for trait names (e.g., BasePrincipalResolver)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{StoreError, UserId};

// =============================================================================
// Principal Resolver Trait (Infrastructure - authentication seam)
// =============================================================================

/// Resolves an opaque credential (bearer token, session cookie, ...) to an
/// authenticated user id.
#[async_trait]
pub trait BasePrincipalResolver: Send + Sync {
    /// Returns the authenticated user id, or `StoreError::Unauthenticated`.
    ///
    /// The error is propagated to callers unchanged; the store never
    /// inspects or refreshes credentials.
    async fn resolve(&self, credential: &str) -> Result<UserId, StoreError>;
}

// =============================================================================
// Blob Store Trait (Infrastructure - media seam)
// =============================================================================

/// Stores raw uploaded bytes and returns an opaque stable URL.
///
/// The returned reference is what ends up in `avatar_url` / `image_url` /
/// `file_url`; the store never inspects file bytes.
#[async_trait]
pub trait BaseBlobStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}
