//! Store error taxonomy.
//!
//! Every operation in the store layer returns `StoreResult<T>`. The calling
//! layer (HTTP, GraphQL, whatever) maps each variant to a transport status;
//! nothing in this crate retries or swallows errors beyond the idempotent
//! no-ops the contracts spell out.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The named entity has no record.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation on create/update (username, email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The authenticated principal lacks rights over the target entity.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Malformed input caught before reaching storage.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not defined for the target entity's state,
    /// e.g. adding a member to a private chat.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// No or invalid principal; surfaced by the principal resolver and
    /// propagated unchanged.
    #[error("authentication required")]
    Unauthenticated,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        StoreError::InvalidArgument(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        StoreError::Conflict(msg.into())
    }
}

// ============================================================================
// Postgres error translation
// ============================================================================

/// True for unique-constraint violations (SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23505")
}

/// True for foreign-key violations (SQLSTATE 23503).
pub fn is_fk_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23503")
}

/// Name of the violated constraint, if the driver reports one.
pub fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned)
}

fn has_sqlstate(err: &sqlx::Error, state: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == state)
        .unwrap_or(false)
}
