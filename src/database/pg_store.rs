use async_trait::async_trait;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseManager;
use crate::database::models::Present;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::{ensure_active, until_cancelled, PresentStore, ReserveOutcome, StoreError};
use crate::filter::filter::PRESENT_COLUMNS;
use crate::filter::PresentFilter;

const TABLE_NAME: &str = "presents";

/// PostgreSQL-backed present store
#[derive(Clone)]
pub struct PgPresentStore {
    pool: PgPool,
}

impl PgPresentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the pool from `config`, migrating first when configured to
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = DatabaseManager::connect(config).await?;
        if config.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_write_error(err: sqlx::Error, id: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(id.to_string());
        }
        if db_err.is_check_violation() {
            return StoreError::Constraint(db_err.message().to_string());
        }
    }
    err.into()
}

#[async_trait]
impl PresentStore for PgPresentStore {
    async fn fetch(
        &self,
        filter: &PresentFilter,
        limit: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, StoreError> {
        let builder = QueryBuilder::<Present>::new(TABLE_NAME)?
            .filter(filter.clone())
            .limit(limit)?;
        debug!(?filter, ?limit, "Fetching presents");
        until_cancelled(cancel, builder.select_all(&self.pool)).await
    }

    async fn fetch_one(&self, id: &str, cancel: &CancellationToken) -> Result<Option<Present>, StoreError> {
        let sql = format!("SELECT {} FROM \"{}\" WHERE \"id\" = $1", PRESENT_COLUMNS, TABLE_NAME);
        until_cancelled(cancel, async {
            let row = sqlx::query_as::<_, Present>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        })
        .await
    }

    async fn insert(&self, present: &Present, cancel: &CancellationToken) -> Result<(), StoreError> {
        ensure_active(cancel)?;
        let sql = format!(
            "INSERT INTO \"{}\" (\"id\", \"name\", \"description\", \"wishlist_id\", \"reserver_id\", \"is_reserved\") \
             VALUES ($1, $2, $3, $4, $5, $6)",
            TABLE_NAME
        );
        sqlx::query(&sql)
            .bind(&present.id)
            .bind(&present.name)
            .bind(&present.description)
            .bind(&present.wishlist_id)
            .bind(&present.reserver_id)
            .bind(present.is_reserved)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &present.id))?;
        Ok(())
    }

    async fn update(&self, present: &Present, cancel: &CancellationToken) -> Result<bool, StoreError> {
        ensure_active(cancel)?;
        let sql = format!(
            "UPDATE \"{}\" SET \"name\" = $2, \"description\" = $3 WHERE \"id\" = $1",
            TABLE_NAME
        );
        let result = sqlx::query(&sql)
            .bind(&present.id)
            .bind(&present.name)
            .bind(&present.description)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reserve(
        &self,
        id: &str,
        reserver_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ReserveOutcome, StoreError> {
        ensure_active(cancel)?;

        // The guard on is_reserved makes the check and the write one statement
        let sql = format!(
            "UPDATE \"{}\" SET \"reserver_id\" = $2, \"is_reserved\" = TRUE \
             WHERE \"id\" = $1 AND \"is_reserved\" = FALSE \
             RETURNING {}",
            TABLE_NAME, PRESENT_COLUMNS
        );
        let reserved = sqlx::query_as::<_, Present>(&sql)
            .bind(id)
            .bind(reserver_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, id))?;

        if let Some(present) = reserved {
            return Ok(ReserveOutcome::Reserved(present));
        }

        // Zero rows: either the id is unknown or the reservation is taken.
        // A reserved row never becomes unreserved again, so this read is stable.
        let exists_sql = format!("SELECT EXISTS (SELECT 1 FROM \"{}\" WHERE \"id\" = $1)", TABLE_NAME);
        let (exists,): (bool,) = sqlx::query_as(&exists_sql).bind(id).fetch_one(&self.pool).await?;
        if exists {
            warn!(present_id = %id, reserver_id = %reserver_id, "Conditional reserve matched no unreserved row");
            Ok(ReserveOutcome::AlreadyReserved)
        } else {
            Ok(ReserveOutcome::Missing)
        }
    }

    async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<bool, StoreError> {
        ensure_active(cancel)?;
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", TABLE_NAME);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        until_cancelled(cancel, DatabaseManager::health_check(&self.pool)).await
    }
}
