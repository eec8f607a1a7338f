/// Lead endpoints
///
/// Every handler acts as the request's [`Principal`]. Leads outside the
/// principal's scope answer `404`; agents calling organisor-only
/// operations get `403`.
///
/// | Method | Path                     | Operation             |
/// |--------|--------------------------|-----------------------|
/// | GET    | /v1/leads                | list                  |
/// | POST   | /v1/leads                | create (+ email)      |
/// | GET    | /v1/leads/:id            | detail                |
/// | PUT    | /v1/leads/:id            | edit                  |
/// | DELETE | /v1/leads/:id            | delete                |
/// | POST   | /v1/leads/:id/assign     | assign to an agent    |
/// | PUT    | /v1/leads/:id/category   | move to a category    |

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{created, ok, MutationResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use leadcrm_shared::{
    identity::Principal,
    models::lead::{Lead, LeadInput},
    services::LeadListing,
};
use serde::Deserialize;
use uuid::Uuid;

/// Assignment request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub agent_id: Uuid,
}

/// Category move request; `null` clears the category
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category_id: Option<Uuid>,
}

pub async fn list_leads(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<LeadListing>> {
    Ok(Json(state.service.list_leads(&principal).await?))
}

pub async fn get_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Lead>> {
    Ok(Json(state.service.get_lead(&principal, id).await?))
}

/// Creates a lead and emails the lead recipients
///
/// A failed email still returns `201`, with `"notification": "failed"`.
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<LeadInput>,
) -> ApiResult<(StatusCode, Json<MutationResponse<Lead>>)> {
    let outcome = state.service.create_lead(&principal, input).await?;
    Ok(created(outcome))
}

pub async fn update_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<LeadInput>,
) -> ApiResult<Json<MutationResponse<Lead>>> {
    let outcome = state.service.update_lead(&principal, id, input).await?;
    Ok(ok(outcome))
}

pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state.service.delete_lead(&principal, id).await?;
    Ok(ok(outcome))
}

/// Assigns a lead to an agent of the same organisation
///
/// # Errors
///
/// - `403 Forbidden`: Caller is an agent
/// - `404 Not Found`: Lead outside the caller's organisation
/// - `422 Unprocessable Entity`: Agent outside the caller's organisation
pub async fn assign_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<MutationResponse<Lead>>> {
    let outcome = state.service.assign_lead(&principal, id, req.agent_id).await?;
    Ok(ok(outcome))
}

/// Moves a lead to another category (or none)
///
/// # Errors
///
/// - `404 Not Found`: Lead outside the caller's scope
/// - `422 Unprocessable Entity`: Category outside the lead's organisation
pub async fn update_lead_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<MutationResponse<Lead>>> {
    let outcome = state
        .service
        .update_lead_category(&principal, id, req.category_id)
        .await?;
    Ok(ok(outcome))
}
