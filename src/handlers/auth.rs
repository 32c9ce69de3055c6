use crate::access::{require_identity, Actor};
use crate::error::{AppError, AppResult};
use crate::middleware::session_token;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::session::SessionService;
use crate::state::AppState;
use crate::utils::password::MAX_PASSWORD_BYTES;
use anyhow::anyhow;
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username (4-20 characters: letters, digits, `_`, `-`, `.`)
    #[validate(length(min = 4, max = 20), custom(function = "validate_username"))]
    pub username: String,
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password (min 6 characters, at most 72 bytes)
    #[validate(length(min = 6), custom(function = "validate_password_size"))]
    pub password: String,
    /// Must repeat `password`
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if allowed {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars"))
    }
}

fn validate_password_size(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        Err(ValidationError::new("password_too_long"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    /// User password
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Session token, also set as the `session_token` cookie
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Username or email already exists", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = SessionService::from_state(&state);
    let user = service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Registration successful. You can now log in.".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid username or password", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = SessionService::from_state(&state);
    let (user, token) = service.login(&payload.username, &payload.password).await?;

    let cookie = state
        .cookies
        .session_cookie(&token, state.tokens.ttl_seconds());
    let response = AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    append_set_cookie(&mut http_response, &cookie)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Logout successful", body = String),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = session_token(&headers);

    let service = SessionService::from_state(&state);
    service.logout(token.as_deref()).await?;

    let mut response = ApiResponse::ok("Logout successful").into_response();
    append_set_cookie(&mut response, &state.cookies.clear_session_cookie())?;
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 303, description = "Not logged in, redirect to login"),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(state): Extension<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    let identity = require_identity(&actor)?;

    let service = SessionService::from_state(&state);
    let user = service.get_user_by_id(identity.user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
