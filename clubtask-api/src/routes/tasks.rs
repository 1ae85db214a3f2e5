/// Task assignment endpoints
///
/// Only Core, Domain and Associate Heads may assign tasks, and only to
/// members in their subordinate set. The team view is open to every member.
///
/// # Endpoints
///
/// - `GET /v1/tasks/subordinates` - Who the caller may assign to
/// - `POST /v1/tasks` - Assign a new task
/// - `GET /v1/tasks/assigned` - Tasks created by the caller's role, by assignee

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use clubtask_shared::{
    auth::{
        authorization::{require_assigner, require_member, require_subordinate},
        hierarchy::subordinates_of,
        middleware::AuthContext,
    },
    models::task::{NewTask, Task, TaskPriority},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Subordinate list response
#[derive(Debug, Serialize)]
pub struct SubordinatesResponse {
    pub subordinates: Vec<String>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Task name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Assignee is required"))]
    pub assigned_to: String,

    /// `YYYY-MM-DD`
    pub deadline: NaiveDate,

    pub priority: TaskPriority,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Create task response
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub task: Task,
    pub message: String,
}

/// One assignee's tasks in the team view
#[derive(Debug, Serialize)]
pub struct TeamGroup {
    pub assignee: String,
    pub tasks: Vec<Task>,
}

/// Team view response
#[derive(Debug, Serialize)]
pub struct TeamViewResponse {
    pub groups: Vec<TeamGroup>,
}

/// Lists the members the caller may assign tasks to
pub async fn list_subordinates(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SubordinatesResponse>> {
    let directory = state.members.load().await?;
    require_assigner(&auth, &directory)?;

    Ok(Json(SubordinatesResponse {
        subordinates: subordinates_of(&auth.member, &directory),
    }))
}

/// Assigns a new task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
///
/// {
///   "name": "Book the hall",
///   "assigned_to": "Cy",
///   "deadline": "2024-09-30",
///   "priority": "High",
///   "description": "Call facilities"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `403 Forbidden`: Caller cannot assign, or assignee is not a subordinate
/// - `500 Internal Server Error`: Store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    req.validate()?;

    let directory = state.members.load().await?;
    let assigner_role = require_assigner(&auth, &directory)?.role.clone();
    require_subordinate(&auth, &req.assigned_to, &directory)?;

    let mut board = state.tasks.load().await?;
    let task = state
        .tasks
        .create(
            &mut board,
            NewTask {
                name: req.name,
                assigned_to: req.assigned_to,
                deadline: req.deadline,
                priority: req.priority,
                description: req.description,
            },
            assigner_role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: format!("Task '{}' assigned to {}!", task.name, task.assigned_to),
            task,
        }),
    ))
}

/// Tasks created by holders of the caller's role, grouped by assignee
///
/// Open to every member; a role that never assigns simply sees no groups.
pub async fn team_view(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TeamViewResponse>> {
    let directory = state.members.load().await?;
    let role = require_member(&auth, &directory)?.role.clone();

    let board = state.tasks.load_or_empty().await;
    let groups = board
        .assigned_by_role(&role)
        .into_iter()
        .map(|(assignee, tasks)| TeamGroup {
            assignee,
            tasks: tasks.into_iter().cloned().collect(),
        })
        .collect();

    Ok(Json(TeamViewResponse { groups }))
}
