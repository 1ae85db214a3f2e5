/// Bulk maintenance endpoints (Devs only)
///
/// - `POST /v1/admin/members/reset-status` - Every member set to Active
/// - `DELETE /v1/admin/tasks` - Empty the task table (header kept)
/// - `POST /v1/admin/cache/clear` - Drop cached snapshots

use crate::{app::AppState, error::ApiResult, routes::members::MessageResponse};
use axum::{extract::State, Extension, Json};
use clubtask_shared::auth::{authorization::require_dev, middleware::AuthContext};
use serde::Serialize;
use tracing::info;

/// Clear tasks response
#[derive(Debug, Serialize)]
pub struct ClearTasksResponse {
    pub removed: usize,
    pub message: String,
}

pub async fn reset_member_statuses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let mut directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    let message = state.members.reset_all_statuses(&mut directory).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn clear_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ClearTasksResponse>> {
    let directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    let mut board = state.tasks.load().await?;
    let removed = state.tasks.clear_all(&mut board).await?;

    Ok(Json(ClearTasksResponse {
        removed,
        message: "All tasks cleared!".to_string(),
    }))
}

pub async fn clear_cache(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    state.cache.invalidate_all().await;
    info!(member = %auth.member, "Snapshot cache cleared");

    Ok(Json(MessageResponse {
        message: "Cache cleared!".to_string(),
    }))
}
