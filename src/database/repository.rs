//! Store adapter contract for present records.
//!
//! Adapters filter, insert, update and delete rows and hold no business
//! rules. The one exception is [`PresentStore::reserve`],
//! which must be a single conditional write so two reservers racing for the
//! same present cannot both win.

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::database::models::Present;
use crate::filter::{FilterError, PresentFilter};

/// Errors from present store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store operation canceled")]
    Canceled,

    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Duplicate present id: {0}")]
    Duplicate(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Connection("pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Connection("pool closed".to_string()),
            sqlx::Error::Io(io) => StoreError::Connection(io.to_string()),
            sqlx::Error::Tls(tls) => StoreError::Connection(tls.to_string()),
            other => StoreError::Sqlx(other),
        }
    }
}

/// Result of the conditional reserve write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The present was unreserved and now belongs to the caller
    Reserved(Present),
    /// Someone else holds the reservation; nothing was written
    AlreadyReserved,
    /// No present with that id exists
    Missing,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresentStore: Send + Sync {
    /// Every present matching `filter`, in stable store order, capped at `limit`
    async fn fetch(
        &self,
        filter: &PresentFilter,
        limit: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, StoreError>;

    async fn fetch_one(&self, id: &str, cancel: &CancellationToken) -> Result<Option<Present>, StoreError>;

    async fn insert(&self, present: &Present, cancel: &CancellationToken) -> Result<(), StoreError>;

    /// Overwrites name and description; `false` when no row has that id.
    ///
    /// Reservation fields are only ever written through [`PresentStore::reserve`].
    async fn update(&self, present: &Present, cancel: &CancellationToken) -> Result<bool, StoreError>;

    /// Sets the reserver only if the stored record is still unreserved
    async fn reserve(
        &self,
        id: &str,
        reserver_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ReserveOutcome, StoreError>;

    /// `false` when no row had that id
    async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<bool, StoreError>;

    async fn health_check(&self, cancel: &CancellationToken) -> Result<(), StoreError>;
}

/// Fails with [`StoreError::Canceled`] if the signal already fired
pub fn ensure_active(cancel: &CancellationToken) -> Result<(), StoreError> {
    if cancel.is_cancelled() {
        return Err(StoreError::Canceled);
    }
    Ok(())
}

/// Runs a read, abandoning it as soon as the signal fires
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    ensure_active(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Canceled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn until_cancelled_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), StoreError> = until_cancelled(&cancel, async { Ok(()) }).await;
        assert!(matches!(result, Err(StoreError::Canceled)));
    }

    #[tokio::test]
    async fn until_cancelled_aborts_pending_read() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result: Result<(), StoreError> =
            until_cancelled(&cancel, std::future::pending::<Result<(), StoreError>>()).await;
        assert!(matches!(result, Err(StoreError::Canceled)));
    }

    #[test]
    fn pool_timeouts_are_connection_errors() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Connection(_)));
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Sqlx(_)));
    }
}
