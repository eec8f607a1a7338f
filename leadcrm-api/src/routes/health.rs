/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "store": "postgres",
///   "notifier": "http-relay"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// Store connectivity
    pub database: String,

    /// Store backend in use
    pub store: String,

    /// Notifier backend in use
    pub notifier: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let store = state.service.store();

    let database_status = match store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(store = store.name(), error = %e, "Health check ping failed");
            "disconnected"
        }
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
        store: store.name().to_string(),
        notifier: state.service.notifier_name().to_string(),
    }))
}
