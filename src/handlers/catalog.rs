// handlers/catalog.rs - public read-only catalog endpoints
//
// Every read here uses the public scope, so inactive rows are invisible.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::database::models::ProductView;
use crate::database::{Category, ContactInfo, ContentSection, ExampleWork, Product, Repository, Scope};
use crate::error::ApiError;
use crate::filter::{parse_category_id, CatalogFilter, CatalogQuery, FilterOptions};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::parse_id;

/// GET /api/products?categoryId=&search=&material=&minPrice=&maxPrice=&sort=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<ProductView>> {
    let filter = CatalogFilter::from_query(&query);
    let products = state.store.search_products(&filter).await?;
    let currency = state.currency();
    Ok(ApiResponse::success(
        products.into_iter().map(|p| ProductView::new(p, currency)).collect(),
    ))
}

/// GET /api/products/filters - options for the catalog filter panel
pub async fn product_filters(State(state): State<AppState>) -> ApiResult<FilterOptions> {
    let products = Repository::<Product>::list(&*state.store, Scope::Public).await?;
    let categories = Repository::<Category>::list(&*state.store, Scope::Public).await?;
    Ok(ApiResponse::success(FilterOptions::aggregate(&products, &categories)))
}

/// GET /api/products/:id
pub async fn show_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductView> {
    let id = parse_id(&id)?;
    let product = Repository::<Product>::find(&*state.store, id, Scope::Public)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product {} not found", id)))?;
    Ok(ApiResponse::success(ProductView::new(product, state.currency())))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(
        Repository::<Category>::list(&*state.store, Scope::Public).await?,
    ))
}

/// GET /api/categories/:id
pub async fn show_category(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Category> {
    let id = parse_id(&id)?;
    let category = Repository::<Category>::find(&*state.store, id, Scope::Public)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category {} not found", id)))?;
    Ok(ApiResponse::success(category))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleWorksQuery {
    pub category_id: Option<String>,
}

/// GET /api/example-works?categoryId=
///
/// A malformed `categoryId` is ignored, as in the product listing.
pub async fn list_example_works(
    State(state): State<AppState>,
    Query(query): Query<ExampleWorksQuery>,
) -> ApiResult<Vec<ExampleWork>> {
    let mut works = Repository::<ExampleWork>::list(&*state.store, Scope::Public).await?;
    if let Some(category_id) = parse_category_id(query.category_id.as_deref()) {
        works.retain(|w| w.category_id == Some(category_id));
    }
    Ok(ApiResponse::success(works))
}

/// GET /api/content
pub async fn list_content(State(state): State<AppState>) -> ApiResult<Vec<ContentSection>> {
    Ok(ApiResponse::success(
        Repository::<ContentSection>::list(&*state.store, Scope::Public).await?,
    ))
}

/// GET /api/content/:key
pub async fn show_content(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<ContentSection> {
    let sections = Repository::<ContentSection>::list(&*state.store, Scope::Public).await?;
    let section = sections
        .into_iter()
        .find(|s| s.key == key)
        .ok_or_else(|| ApiError::not_found(format!("Content section '{}' not found", key)))?;
    Ok(ApiResponse::success(section))
}

/// GET /api/contact
pub async fn list_contact(State(state): State<AppState>) -> ApiResult<Vec<ContactInfo>> {
    Ok(ApiResponse::success(
        Repository::<ContactInfo>::list(&*state.store, Scope::Public).await?,
    ))
}
