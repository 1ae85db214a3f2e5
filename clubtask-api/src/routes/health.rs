/// Health check endpoint
///
/// Reports whether the sheet store answers a read of the `Members` table.
/// The read bypasses the snapshot cache.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "backend": "postgres",
///   "store": "reachable"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use clubtask_shared::models::member::MEMBER_COLUMNS;
use clubtask_shared::store::members::MEMBERS_TABLE;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// Store backend label
    pub backend: String,

    /// `reachable` or `unreachable`
    pub store: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let reachable = match state.store.read_all(MEMBERS_TABLE, MEMBER_COLUMNS).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Health check could not read the store");
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if reachable { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend_name().to_string(),
        store: if reachable { "reachable" } else { "unreachable" }.to_string(),
    }))
}
