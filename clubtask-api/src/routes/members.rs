/// Member management endpoints (Devs only)
///
/// The caller's Dev role is read from the current directory, not the token.
///
/// # Endpoints
///
/// - `GET /v1/members?status=&role=` - Filtered member list
/// - `GET /v1/members/pending` - Registrations awaiting approval
/// - `GET /v1/members/stats` - Counts by status
/// - `POST /v1/members/:name/approve` - Approve (Dev targets: parent Dev only)
/// - `POST /v1/members/:name/reject` - Reject a registration (deletes it)
/// - `POST /v1/members/:name/suspend`
/// - `POST /v1/members/:name/reactivate`
/// - `PUT /v1/members/:name/role` - Change role
/// - `DELETE /v1/members/:name` - Delete (not yourself)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use clubtask_shared::{
    auth::{authorization::require_dev, middleware::AuthContext},
    models::member::{Member, MemberDirectory, MemberQuery, MemberRole, MemberStats},
};
use serde::{Deserialize, Serialize};

/// Member list response
#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

/// Outcome message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

fn member_list(members: Vec<&Member>) -> Json<MemberListResponse> {
    Json(MemberListResponse {
        members: members.into_iter().cloned().collect(),
    })
}

/// Loads the directory for a write and checks the caller is a Dev
async fn load_as_dev(state: &AppState, auth: &AuthContext) -> ApiResult<MemberDirectory> {
    let directory = state.members.load().await?;
    require_dev(auth, &directory)?;
    Ok(directory)
}

/// Lists members, optionally filtered by status and role
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<MemberQuery>,
) -> ApiResult<Json<MemberListResponse>> {
    let directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    Ok(member_list(directory.query(&query)))
}

/// Lists registrations awaiting approval
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MemberListResponse>> {
    let directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    Ok(member_list(directory.pending()))
}

/// Counts members by status
pub async fn member_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MemberStats>> {
    let directory = state.members.load().await?;
    require_dev(&auth, &directory)?;

    Ok(Json(directory.status_counts()))
}

/// Approves a member, recording the caller as approver
pub async fn approve_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let mut directory = load_as_dev(&state, &auth).await?;
    let message = state.members.approve(&mut directory, &name, &auth.member).await?;

    Ok(Json(MessageResponse { message }))
}

/// Rejects a registration by deleting it
pub async fn reject_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let mut directory = load_as_dev(&state, &auth).await?;
    state.members.delete(&mut directory, &name).await?;

    Ok(Json(MessageResponse {
        message: format!("Rejected and deleted {}", name),
    }))
}

/// Suspends a member
pub async fn suspend_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let mut directory = load_as_dev(&state, &auth).await?;
    let message = state.members.suspend(&mut directory, &name).await?;

    Ok(Json(MessageResponse { message }))
}

/// Reactivates a member
pub async fn reactivate_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let mut directory = load_as_dev(&state, &auth).await?;
    let message = state.members.reactivate(&mut directory, &name).await?;

    Ok(Json(MessageResponse { message }))
}

/// Changes a member's role
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Unknown role
pub async fn change_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let role = MemberRole::parse(&req.role);
    if !role.is_known() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "role".to_string(),
            message: format!("Unknown role: {}", req.role),
        }]));
    }

    let mut directory = load_as_dev(&state, &auth).await?;
    let message = state.members.change_role(&mut directory, &name, role).await?;

    Ok(Json(MessageResponse { message }))
}

/// Deletes a member
///
/// # Errors
///
/// - `400 Bad Request`: Caller tried to delete their own account
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if name == auth.member {
        return Err(ApiError::BadRequest("Cannot delete your own account!".to_string()));
    }

    let mut directory = load_as_dev(&state, &auth).await?;
    let message = state.members.delete(&mut directory, &name).await?;

    Ok(Json(MessageResponse { message }))
}
