//! Catalog filter composition.
//!
//! Query parameters arrive as loose strings. [`CatalogFilter::from_query`]
//! keeps the ones that parse and silently drops the rest; the resulting
//! predicate renders to SQL for Postgres or evaluates directly against a
//! [`Product`] for the in-memory store.

pub mod filter_order;
pub mod filter_where;
pub mod options;
pub mod types;

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::Product;
use filter_order::FilterOrder;
use filter_where::{contains_pattern, FilterWhere};
use types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, SqlParam, SqlResult};

pub use options::FilterOptions;

/// Raw catalog listing parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub material: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Newest,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        SortOption::Newest,
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::NameAsc => "name_asc",
            SortOption::NameDesc => "name_desc",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Newest => "Newest first",
            SortOption::NameAsc => "Name (A-Z)",
            SortOption::NameDesc => "Name (Z-A)",
            SortOption::PriceAsc => "Price: low to high",
            SortOption::PriceDesc => "Price: high to low",
        }
    }

    /// Unknown values fall back to the default ordering.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .and_then(|v| Self::ALL.into_iter().find(|option| option.as_str() == v))
            .unwrap_or_default()
    }

    fn order_infos(self) -> Vec<FilterOrderInfo> {
        let primary = match self {
            SortOption::Newest => FilterOrderInfo { column: "created_at", sort: SortDirection::Desc },
            SortOption::NameAsc => FilterOrderInfo { column: "name", sort: SortDirection::Asc },
            SortOption::NameDesc => FilterOrderInfo { column: "name", sort: SortDirection::Desc },
            SortOption::PriceAsc => FilterOrderInfo { column: "price", sort: SortDirection::Asc },
            SortOption::PriceDesc => FilterOrderInfo { column: "price", sort: SortDirection::Desc },
        };
        vec![primary, FilterOrderInfo { column: "id", sort: SortDirection::Asc }]
    }

    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        let primary = match self {
            SortOption::Newest => b.created_at.cmp(&a.created_at),
            SortOption::NameAsc => a.name.cmp(&b.name),
            SortOption::NameDesc => b.name.cmp(&a.name),
            SortOption::PriceAsc => compare_prices(a.price, b.price, false),
            SortOption::PriceDesc => compare_prices(a.price, b.price, true),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Missing prices sort last in both directions.
fn compare_prices(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Typed product predicate. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub material: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortOption,
    pub include_inactive: bool,
}

impl CatalogFilter {
    pub fn from_query(query: &CatalogQuery) -> Self {
        Self {
            category_id: parse_category_id(query.category_id.as_deref()),
            search: non_blank(query.search.as_deref()),
            material: non_blank(query.material.as_deref()),
            min_price: parse_decimal(query.min_price.as_deref()),
            max_price: parse_decimal(query.max_price.as_deref()),
            sort: SortOption::parse_lenient(query.sort.as_deref()),
            include_inactive: false,
        }
    }

    pub fn including_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    pub fn conditions(&self) -> Vec<FilterWhereInfo> {
        let mut conditions = Vec::new();
        if !self.include_inactive {
            conditions.push(FilterWhereInfo {
                columns: vec!["is_active"],
                operator: FilterOp::Eq,
                data: SqlParam::Bool(true),
            });
        }
        if let Some(category_id) = self.category_id {
            conditions.push(FilterWhereInfo {
                columns: vec!["category_id"],
                operator: FilterOp::Eq,
                data: SqlParam::Int(Some(category_id)),
            });
        }
        if let Some(search) = &self.search {
            conditions.push(FilterWhereInfo {
                columns: vec!["name", "short_description"],
                operator: FilterOp::ILike,
                data: SqlParam::Text(Some(contains_pattern(search))),
            });
        }
        if let Some(material) = &self.material {
            conditions.push(FilterWhereInfo {
                columns: vec!["materials"],
                operator: FilterOp::ILike,
                data: SqlParam::Text(Some(contains_pattern(material))),
            });
        }
        if let Some(min) = self.min_price {
            conditions.push(FilterWhereInfo {
                columns: vec!["price"],
                operator: FilterOp::Gte,
                data: SqlParam::Decimal(Some(min)),
            });
        }
        if let Some(max) = self.max_price {
            conditions.push(FilterWhereInfo {
                columns: vec!["price"],
                operator: FilterOp::Lte,
                data: SqlParam::Decimal(Some(max)),
            });
        }
        conditions
    }

    pub fn to_sql(&self, table: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions(), 0);
        let order = FilterOrder::generate(&self.sort.order_infos());
        SqlResult {
            query: format!("SELECT * FROM \"{}\" WHERE {} {}", table, where_clause, order),
            params,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let in_name = contains_ignore_case(&product.name, search);
            let in_summary = product
                .short_description
                .as_deref()
                .is_some_and(|s| contains_ignore_case(s, search));
            if !in_name && !in_summary {
                return false;
            }
        }
        if let Some(material) = &self.material {
            if !product
                .materials
                .as_deref()
                .is_some_and(|m| contains_ignore_case(m, material))
            {
                return false;
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = product.price else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) || self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        true
    }
}

/// Malformed category ids are ignored rather than rejected.
pub fn parse_category_id(value: Option<&str>) -> Option<i32> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|v| Decimal::from_str(v.trim()).ok())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
