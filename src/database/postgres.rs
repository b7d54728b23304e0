use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::database::manager::{self, DatabaseError};
use crate::database::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::database::{CatalogStore, Product, Record, Repository, Scope};
use crate::filter::types::SqlResult;
use crate::filter::CatalogFilter;

/// Postgres-backed catalog store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Ok(Self::from_pool(manager::connect(url, config).await?))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        manager::migrate(&self.pool).await
    }

    async fn fetch_all<R>(&self, sql: SqlResult) -> Result<Vec<R>, DatabaseError>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        debug!("SQL: {}", sql.query);
        let mut q = sqlx::query_as::<_, R>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn fetch_optional<R>(&self, sql: SqlResult) -> Result<Option<R>, DatabaseError>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        debug!("SQL: {}", sql.query);
        let mut q = sqlx::query_as::<_, R>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl<R> Repository<R> for PgStore
where
    R: Record + for<'r> FromRow<'r, PgRow>,
{
    async fn list(&self, scope: Scope) -> Result<Vec<R>, DatabaseError> {
        self.fetch_all(QueryBuilder::<R>::select_all(scope)).await
    }

    async fn find(&self, id: i32, scope: Scope) -> Result<Option<R>, DatabaseError> {
        self.fetch_optional(QueryBuilder::<R>::select_one(id, scope)).await
    }

    async fn insert(&self, input: R::Input) -> Result<R, DatabaseError> {
        let created: Option<R> = self.fetch_optional(QueryBuilder::<R>::insert(&input)).await?;
        created.ok_or_else(|| DatabaseError::QueryError(format!("INSERT into {} returned no row", R::TABLE)))
    }

    async fn update(&self, id: i32, input: R::Input) -> Result<Option<R>, DatabaseError> {
        self.fetch_optional(QueryBuilder::<R>::update(id, &input)).await
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let sql = QueryBuilder::<R>::delete(id);
        debug!("SQL: {}", sql.query);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn search_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, DatabaseError> {
        self.fetch_all(filter.to_sql(Product::TABLE)).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        manager::health_check(&self.pool).await
    }
}
