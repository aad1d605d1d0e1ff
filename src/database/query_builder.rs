use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::repository::StoreError;
use crate::filter::{Filter, PresentFilter, SqlResult};

pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, StoreError> {
        let filter = Filter::new(table_name)?;
        Ok(Self {
            filter,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, present_filter: PresentFilter) -> Self {
        self.filter.matching(present_filter);
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Result<Self, StoreError> {
        if let Some(limit) = limit {
            self.filter.limit(limit)?;
        }
        Ok(self)
    }

    pub fn sql_result(&self) -> Result<SqlResult, StoreError> {
        Ok(self.filter.to_sql()?)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, StoreError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q str,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    q.bind(v)
}
