//! Repository Module
//!
//! Typed per-table operations over the SQLite pool. Every race-sensitive
//! mutation is a guarded single-statement UPDATE so the store itself
//! serializes writers; read functions take `&SqlitePool`, write functions
//! take `&mut SqliteConnection` so compound operations compose inside one
//! transaction.

pub mod canonical;
pub mod day_override;
pub mod ledger;
pub mod presale;
pub mod seller;
pub mod slot;
pub mod ticket;

use shared::DomainErrorCode;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}: {1}")]
    Domain(DomainErrorCode, String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory SQLite pool with the full schema applied.
    ///
    /// Single connection: each `sqlite::memory:` connection is its own
    /// database, so the pool must never open a second one.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }
}
