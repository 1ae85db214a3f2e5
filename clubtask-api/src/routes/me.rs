/// The caller's own tasks
///
/// # Endpoints
///
/// - `GET /v1/me/tasks?status=&priority=` - Tasks assigned to the caller
/// - `GET /v1/me/summary` - Counts by status
/// - `PUT /v1/me/tasks/:task_id/status` - Update one of the caller's tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use clubtask_shared::{
    auth::{
        authorization::{require_assignee, require_member},
        middleware::AuthContext,
    },
    models::task::{Task, TaskId, TaskQuery, TaskStatus, TaskSummary},
};
use serde::{Deserialize, Serialize};

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// `Pending`, `In Progress` or `Completed`
    pub status: TaskStatus,
}

/// Status update response
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub task: Task,
    pub message: String,
}

/// Lists the caller's tasks, optionally filtered by status and priority
///
/// ```text
/// GET /v1/me/tasks?status=In%20Progress&priority=High
/// ```
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let directory = state.members.load().await?;
    require_member(&auth, &directory)?;

    let board = state.tasks.load_or_empty().await;

    Ok(Json(TaskListResponse {
        tasks: board.tasks_for(&auth.member, &query).into_iter().cloned().collect(),
    }))
}

/// Counts the caller's tasks by status
pub async fn my_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskSummary>> {
    let directory = state.members.load().await?;
    require_member(&auth, &directory)?;

    let board = state.tasks.load_or_empty().await;

    Ok(Json(board.summary_for(&auth.member)))
}

/// Updates the status of one of the caller's tasks
///
/// # Errors
///
/// - `401 Unauthorized`: Caller no longer exists or is no longer Active
/// - `403 Forbidden`: Caller is not the assignee
/// - `404 Not Found`: No such task
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<u32>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    let directory = state.members.load().await?;
    require_member(&auth, &directory)?;

    let mut board = state.tasks.load().await?;
    let id = TaskId(task_id);
    let task = board
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("Task {} not found", id)))?;
    require_assignee(&auth, task)?;

    let task = state.tasks.update_status(&mut board, id, req.status).await?;

    Ok(Json(UpdateStatusResponse {
        message: format!("Task status updated to {}!", task.status),
        task,
    }))
}
