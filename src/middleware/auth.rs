use crate::{
    error::AppError,
    models::User,
    utils::{
        cookie::{extract_cookie, SESSION_COOKIE},
        jwt::{decode_token, TokenKind},
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// The signed-in owner of the current request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
}

/// Resolve the session from `Authorization: Bearer` or the session cookie.
/// Refresh tokens are not accepted here, and the account must still exist.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)
        .or_else(|| extract_cookie(&headers, SESSION_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_token(&token, TokenKind::Access).map_err(|e| {
        tracing::debug!("Rejected access token: {e}");
        AppError::Unauthorized
    })?;
    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request
        .extensions_mut()
        .insert(AuthUser { user_id: user.id });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
