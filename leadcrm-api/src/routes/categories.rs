/// Category endpoints
///
/// - `GET /v1/categories` - Categories with lead counts and the
///   uncategorised count
/// - `GET /v1/categories/:id` - One category with the caller's leads in it

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use leadcrm_shared::{
    identity::Principal,
    models::category::{CategoryDetail, CategoryListing},
};
use uuid::Uuid;

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<CategoryListing>> {
    Ok(Json(state.service.list_categories(&principal).await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryDetail>> {
    Ok(Json(state.service.get_category(&principal, id).await?))
}
