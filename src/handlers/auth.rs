use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::services::email::EmailService;
use crate::utils::{
    cookie::{build_auth_cookie, build_clear_cookie, extract_cookie, REFRESH_COOKIE, SESSION_COOKIE},
    jwt::{decode_token, expiry_seconds, issue_token_pair, TokenKind, TokenPair},
};
use anyhow::anyhow;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendOtpRequest {
    /// Email address to send the one-time code to
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    /// Email address the code was sent to
    #[validate(email)]
    pub email: String,
    /// Six character one-time code
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: i32,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub image: Option<String>,
    /// USER or ADMIN
    pub role: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            role: user.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Verification code sent", body = String),
        (status = 400, description = "Invalid email", body = AppError),
    ),
    tag = "auth"
)]
pub async fn send_otp(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<SendOtpRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    service.issue_otp(&payload.email, &email_service).await?;

    Ok(ApiResponse::with_message(
        (),
        "If the address is valid, a verification code is on its way",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Authentication failed", body = AppError),
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    Extension(db): Extension<DatabaseConnection>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    // A malformed submission fails the same way as a wrong code.
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected verify-otp body: {e}");
        AppError::Unauthorized
    })?;
    if payload.validate().is_err() {
        return Err(AppError::Unauthorized);
    }

    let service = AuthService::new(db);
    let user = service.authorize(&payload.email, &payload.code).await?;
    let tokens = issue_token_pair(user.id)?;

    tracing::info!("User {} signed in", user.id);

    let response = AuthResponse {
        token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
        user: UserResponse::from(user),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &tokens)?;
    Ok(http_response)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let user = service.get_user_by_id(auth_user.user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token; the refresh cookie is used when omitted
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// New JWT access token
    pub token: String,
    /// New JWT refresh token
    pub refresh_token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    payload: Option<Json<RefreshTokenRequest>>,
) -> AppResult<impl IntoResponse> {
    let refresh_token = payload
        .and_then(|Json(body)| body.refresh_token)
        .filter(|token| !token.is_empty())
        .or_else(|| extract_cookie(&headers, REFRESH_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_token(&refresh_token, TokenKind::Refresh).map_err(|e| {
        tracing::debug!("Rejected refresh token: {e}");
        AppError::Unauthorized
    })?;
    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    // The account may have been removed since the token was issued.
    let service = AuthService::new(db);
    let user = service
        .get_user_by_id(user_id)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let tokens = issue_token_pair(user.id)?;
    let response = TokenResponse {
        token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &tokens)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Logout successful", body = String),
    ),
    tag = "auth"
)]
pub async fn logout() -> AppResult<impl IntoResponse> {
    let mut response = ApiResponse::ok("Logout successful").into_response();
    clear_auth_cookies(&mut response)?;
    Ok(response)
}

fn set_auth_cookies(response: &mut Response, tokens: &TokenPair) -> AppResult<()> {
    append_set_cookie(
        response,
        &build_auth_cookie(
            SESSION_COOKIE,
            &tokens.access_token,
            expiry_seconds(TokenKind::Access),
        ),
    )?;
    append_set_cookie(
        response,
        &build_auth_cookie(
            REFRESH_COOKIE,
            &tokens.refresh_token,
            expiry_seconds(TokenKind::Refresh),
        ),
    )?;
    Ok(())
}

fn clear_auth_cookies(response: &mut Response) -> AppResult<()> {
    append_set_cookie(response, &build_clear_cookie(SESSION_COOKIE))?;
    append_set_cookie(response, &build_clear_cookie(REFRESH_COOKIE))?;
    Ok(())
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
