pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{types::SqlParam, CatalogFilter};
use crate::validation::FromPayload;

pub use manager::DatabaseError;
pub use memory::{Fixture, MemoryStore};
pub use models::{Category, ContactInfo, ContentSection, ExampleWork, Product};
pub use postgres::PgStore;

/// Which rows a read may see. Public reads skip inactive rows, admin
/// reads see everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    Admin,
}

impl Scope {
    pub fn admits(self, is_active: bool) -> bool {
        matches!(self, Scope::Admin) || is_active
    }
}

/// A catalog table row together with the input that creates or replaces it.
pub trait Record: Clone + Serialize + Send + Sync + Unpin + 'static {
    type Input: FromPayload + Send + Sync + 'static;

    const TABLE: &'static str;
    /// Human name used in error messages.
    const LABEL: &'static str;
    /// Writable columns, in the order [`Record::params`] binds them.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;
    /// Soft-deleted rows are marked inactive instead of removed.
    const SOFT_DELETE: bool;
    /// Column holding a value that must be unique across the table.
    const UNIQUE_COLUMN: Option<&'static str> = None;

    fn id(&self) -> i32;
    fn is_active(&self) -> bool;
    fn deactivate(&mut self, now: DateTime<Utc>);
    fn params(input: &Self::Input) -> Vec<SqlParam>;
    fn create(id: i32, input: Self::Input, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, input: Self::Input, now: DateTime<Utc>);

    fn unique_value(&self) -> Option<&str> {
        None
    }

    fn input_unique_value(_input: &Self::Input) -> Option<&str> {
        None
    }

    /// In-memory counterpart of [`Record::ORDER_BY`].
    fn listing_order(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn list(&self, scope: Scope) -> Result<Vec<R>, DatabaseError>;
    async fn find(&self, id: i32, scope: Scope) -> Result<Option<R>, DatabaseError>;
    async fn insert(&self, input: R::Input) -> Result<R, DatabaseError>;
    async fn update(&self, id: i32, input: R::Input) -> Result<Option<R>, DatabaseError>;
    /// Returns `false` when no row had the given id.
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

/// Everything the handlers need from the data store.
#[async_trait]
pub trait CatalogStore:
    Repository<Product>
    + Repository<Category>
    + Repository<ExampleWork>
    + Repository<ContentSection>
    + Repository<ContactInfo>
{
    async fn search_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}
