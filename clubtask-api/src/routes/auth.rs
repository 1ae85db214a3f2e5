/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a member (pending unless first Dev)
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/auth/bootstrap` - First-user state for the registration form

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use clubtask_shared::{
    auth::{
        authentication::authenticate, authorization::require_member, jwt,
        middleware::AuthContext,
    },
    models::member::{MemberRole, MemberStatus},
    services::error::ServiceError,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Member name (the login identifier)
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    /// One of the five hierarchy roles
    pub role: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub name: String,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub message: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub name: String,
    pub role: MemberRole,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// First-user state
#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    /// False until the first registration
    pub has_members: bool,

    /// False until a Dev exists
    pub has_dev: bool,

    /// Role choices for the registration form, Dev first while there is no Dev
    pub role_options: Vec<MemberRole>,

    /// Names offered on the login form (Active members and Devs)
    pub login_candidates: Vec<String>,
}

/// Register a new member
///
/// The first Dev registered into an empty directory is Active immediately;
/// every other account waits for approval.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "password": "secret",
///   "confirm_password": "secret",
///   "role": "Dev"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or unknown role
/// - `409 Conflict`: Name already exists
/// - `500 Internal Server Error`: Store failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let role = MemberRole::parse(&req.role);
    if !role.is_known() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "role".to_string(),
            message: format!("Unknown role: {}", req.role),
        }]));
    }

    let mut directory = state.members.load().await?;
    let registration = state
        .members
        .register(&mut directory, &req.name, &req.password, role)
        .await
        .map_err(|e| match e {
            ServiceError::Validation(msg) if directory.contains(&req.name) => ApiError::Conflict(msg),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            name: registration.name,
            role: registration.role,
            status: registration.status,
            message: registration.message,
        }),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "name": "Ada", "password": "secret" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: No users, unknown name, inactive account, or wrong password
/// - `500 Internal Server Error`: Member table could not be read
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let directory = state.members.load().await?;
    let member = authenticate(&req.name, &req.password, &directory)?;

    let access_claims = jwt::Claims::new(member.name.clone(), member.role.clone(), jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(member.name.clone(), member.role.clone(), jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    info!(member = %member.name, role = %member.role, "Member logged in");

    Ok(Json(LoginResponse {
        name: member.name,
        role: member.role,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. The member must still
/// pass the login status gate, and the new token carries their current role.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or the member was
///   deleted or is no longer Active
/// - `500 Internal Server Error`: Member table could not be read
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;
    let auth = AuthContext::from_claims(claims);

    let directory = state.members.load().await?;
    let member = require_member(&auth, &directory)?;

    let access_claims = jwt::Claims::new(member.name.clone(), member.role.clone(), jwt::TokenType::Access);
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// First-user state
///
/// Read-only: a store failure shows an empty directory.
pub async fn bootstrap(State(state): State<AppState>) -> Json<BootstrapResponse> {
    let directory = state.members.load_or_empty().await;
    let has_dev = directory.has_dev();

    let mut role_options = MemberRole::HIERARCHY.to_vec();
    if has_dev {
        role_options.reverse();
    }

    Json(BootstrapResponse {
        has_members: !directory.is_empty(),
        has_dev,
        role_options,
        login_candidates: directory.login_candidates(),
    })
}
