/// Agent management endpoints (organisors only)
///
/// - `GET /v1/agents`, `POST /v1/agents`
/// - `GET|PUT|DELETE /v1/agents/:id`
///
/// Creating an agent emails an invitation from the organisor's address.

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
    models::agent::{Agent, AgentInput},
};
use uuid::Uuid;

pub async fn list_agents(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.service.list_agents(&principal).await?))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Agent>> {
    Ok(Json(state.service.get_agent(&principal, id).await?))
}

pub async fn create_agent(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<AgentInput>,
) -> ApiResult<(StatusCode, Json<MutationResponse<Agent>>)> {
    let outcome = state.service.create_agent(&principal, input).await?;
    Ok(created(outcome))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<AgentInput>,
) -> ApiResult<Json<MutationResponse<Agent>>> {
    let outcome = state.service.update_agent(&principal, id, input).await?;
    Ok(ok(outcome))
}

/// Deletes the agent and its account; its leads become unassigned
pub async fn delete_agent(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MutationResponse<()>>> {
    let outcome = state.service.delete_agent(&principal, id).await?;
    Ok(ok(outcome))
}
