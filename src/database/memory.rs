//! In-process catalog store.
//!
//! Backs `serve --fixture` and the test suite. Tables live behind
//! `tokio::sync::RwLock`s and follow the same visibility, ordering,
//! uniqueness and delete rules as the Postgres store. Foreign keys are
//! not checked.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::{
    CatalogStore, Category, ContactInfo, ContentSection, ExampleWork, Product, Record, Repository, Scope,
};
use crate::filter::CatalogFilter;

/// Seed data for a [`MemoryStore`], one array per table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub example_works: Vec<ExampleWork>,
    pub content_sections: Vec<ContentSection>,
    pub contact_info: Vec<ContactInfo>,
}

impl Fixture {
    pub async fn load(path: &Path) -> Result<Self, DatabaseError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatabaseError::Fixture(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| DatabaseError::Fixture(format!("{}: {}", path.display(), e)))
    }
}

pub struct MemoryTable<R> {
    rows: Vec<R>,
    next_id: i32,
}

impl<R: Record> MemoryTable<R> {
    fn empty() -> Self {
        Self { rows: Vec::new(), next_id: 1 }
    }

    fn seeded(rows: Vec<R>) -> Result<Self, DatabaseError> {
        let mut ids = HashSet::new();
        let mut uniques = HashSet::new();
        for row in &rows {
            if !ids.insert(row.id()) {
                return Err(DatabaseError::Fixture(format!("duplicate id {} in {}", row.id(), R::TABLE)));
            }
            if let Some(value) = row.unique_value() {
                if !uniques.insert(value.to_string()) {
                    return Err(DatabaseError::Fixture(format!("duplicate value {:?} in {}", value, R::TABLE)));
                }
            }
        }
        let next_id = rows.iter().map(Record::id).max().unwrap_or(0) + 1;
        Ok(Self { rows, next_id })
    }

    fn check_unique(&self, input: &R::Input, except: Option<i32>) -> Result<(), DatabaseError> {
        let (Some(column), Some(value)) = (R::UNIQUE_COLUMN, R::input_unique_value(input)) else {
            return Ok(());
        };
        let taken = self
            .rows
            .iter()
            .any(|row| Some(row.id()) != except && row.unique_value() == Some(value));
        if taken {
            return Err(DatabaseError::Conflict(format!("{}_{}_key", R::TABLE, column)));
        }
        Ok(())
    }
}

/// Gives the generic repository access to the table holding `Self`.
pub trait MemoryRecord: Record {
    fn table(store: &MemoryStore) -> &RwLock<MemoryTable<Self>>;
}

macro_rules! memory_record {
    ($record:ty, $field:ident) => {
        impl MemoryRecord for $record {
            fn table(store: &MemoryStore) -> &RwLock<MemoryTable<Self>> {
                &store.$field
            }
        }
    };
}

pub struct MemoryStore {
    products: RwLock<MemoryTable<Product>>,
    categories: RwLock<MemoryTable<Category>>,
    example_works: RwLock<MemoryTable<ExampleWork>>,
    content_sections: RwLock<MemoryTable<ContentSection>>,
    contact_info: RwLock<MemoryTable<ContactInfo>>,
}

memory_record!(Product, products);
memory_record!(Category, categories);
memory_record!(ExampleWork, example_works);
memory_record!(ContentSection, content_sections);
memory_record!(ContactInfo, contact_info);

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(MemoryTable::empty()),
            categories: RwLock::new(MemoryTable::empty()),
            example_works: RwLock::new(MemoryTable::empty()),
            content_sections: RwLock::new(MemoryTable::empty()),
            contact_info: RwLock::new(MemoryTable::empty()),
        }
    }

    pub fn from_fixture(fixture: Fixture) -> Result<Self, DatabaseError> {
        info!(
            "Loaded fixture: {} products, {} categories, {} example works, {} content sections, {} contact entries",
            fixture.products.len(),
            fixture.categories.len(),
            fixture.example_works.len(),
            fixture.content_sections.len(),
            fixture.contact_info.len()
        );
        Ok(Self {
            products: RwLock::new(MemoryTable::seeded(fixture.products)?),
            categories: RwLock::new(MemoryTable::seeded(fixture.categories)?),
            example_works: RwLock::new(MemoryTable::seeded(fixture.example_works)?),
            content_sections: RwLock::new(MemoryTable::seeded(fixture.content_sections)?),
            contact_info: RwLock::new(MemoryTable::seeded(fixture.contact_info)?),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, DatabaseError> {
        Self::from_fixture(Fixture::load(path).await?)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: MemoryRecord> Repository<R> for MemoryStore {
    async fn list(&self, scope: Scope) -> Result<Vec<R>, DatabaseError> {
        let table = R::table(self).read().await;
        let mut rows: Vec<R> = table.rows.iter().filter(|r| scope.admits(r.is_active())).cloned().collect();
        rows.sort_by(|a, b| a.listing_order(b));
        Ok(rows)
    }

    async fn find(&self, id: i32, scope: Scope) -> Result<Option<R>, DatabaseError> {
        let table = R::table(self).read().await;
        Ok(table
            .rows
            .iter()
            .find(|r| r.id() == id && scope.admits(r.is_active()))
            .cloned())
    }

    async fn insert(&self, input: R::Input) -> Result<R, DatabaseError> {
        let mut table = R::table(self).write().await;
        table.check_unique(&input, None)?;
        let record = R::create(table.next_id, input, Utc::now());
        table.next_id += 1;
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i32, input: R::Input) -> Result<Option<R>, DatabaseError> {
        let mut table = R::table(self).write().await;
        if !table.rows.iter().any(|r| r.id() == id) {
            return Ok(None);
        }
        table.check_unique(&input, Some(id))?;
        let updated = table.rows.iter_mut().find(|r| r.id() == id).map(|row| {
            row.apply(input, Utc::now());
            row.clone()
        });
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut table = R::table(self).write().await;
        if R::SOFT_DELETE {
            return Ok(match table.rows.iter_mut().find(|r| r.id() == id) {
                Some(row) => {
                    row.deactivate(Utc::now());
                    true
                }
                None => false,
            });
        }
        let before = table.rows.len();
        table.rows.retain(|r| r.id() != id);
        Ok(table.rows.len() < before)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn search_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, DatabaseError> {
        let table = self.products.read().await;
        let mut rows: Vec<Product> = table.rows.iter().filter(|p| filter.matches(p)).cloned().collect();
        rows.sort_by(|a, b| filter.sort.compare(a, b));
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
