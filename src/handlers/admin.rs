// handlers/admin.rs - /api/admin/* CRUD handlers
//
// Mounted behind the access gate. One generic set of handlers serves every
// record type; reads use the admin scope and therefore include inactive rows.

use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::database::models::ProductView;
use crate::database::{CatalogStore, Record, Repository, Scope};
use crate::error::ApiError;
use crate::filter::{CatalogFilter, CatalogQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::FromPayload;

use super::parse_id;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
    /// `true` when the row was kept and marked inactive.
    pub deactivated: bool,
}

fn not_found<R: Record>(id: i32) -> ApiError {
    ApiError::not_found(format!("{} {} not found", R::LABEL, id))
}

fn read_input<R: Record>(body: Result<Json<Value>, JsonRejection>) -> Result<R::Input, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    Ok(R::Input::from_payload(&body)?)
}

/// GET /api/admin/products - same filters as the public listing, inactive included
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<ProductView>> {
    let filter = CatalogFilter::from_query(&query).including_inactive();
    let products = state.store.search_products(&filter).await?;
    let currency = state.currency();
    Ok(ApiResponse::success(
        products.into_iter().map(|p| ProductView::new(p, currency)).collect(),
    ))
}

/// GET /api/admin/{records}
pub async fn list<R>(State(state): State<AppState>) -> ApiResult<Vec<R>>
where
    R: Record,
    dyn CatalogStore: Repository<R>,
{
    Ok(ApiResponse::success(
        Repository::<R>::list(&*state.store, Scope::Admin).await?,
    ))
}

/// GET /api/admin/{records}/:id
pub async fn show<R>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<R>
where
    R: Record,
    dyn CatalogStore: Repository<R>,
{
    let id = parse_id(&id)?;
    let record = Repository::<R>::find(&*state.store, id, Scope::Admin)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    Ok(ApiResponse::success(record))
}

/// POST /api/admin/{records}
pub async fn create<R>(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<R>
where
    R: Record,
    dyn CatalogStore: Repository<R>,
{
    let input = read_input::<R>(body)?;
    let record = Repository::<R>::insert(&*state.store, input).await?;
    info!("Created {} {}", R::LABEL, record.id());
    Ok(ApiResponse::created(record))
}

/// PUT /api/admin/{records}/:id - full replacement
pub async fn update<R>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<R>
where
    R: Record,
    dyn CatalogStore: Repository<R>,
{
    let id = parse_id(&id)?;
    let input = read_input::<R>(body)?;
    let record = Repository::<R>::update(&*state.store, id, input)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    info!("Updated {} {}", R::LABEL, id);
    Ok(ApiResponse::success(record))
}

/// DELETE /api/admin/{records}/:id
pub async fn destroy<R>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted>
where
    R: Record,
    dyn CatalogStore: Repository<R>,
{
    let id = parse_id(&id)?;
    if !Repository::<R>::delete(&*state.store, id).await? {
        return Err(not_found::<R>(id));
    }
    info!("Deleted {} {} (soft: {})", R::LABEL, id, R::SOFT_DELETE);
    Ok(ApiResponse::success(Deleted {
        id,
        deactivated: R::SOFT_DELETE,
    }))
}
