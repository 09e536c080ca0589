use crate::builder::{PageConfig, ResolvedTheme};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::PageModel;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::page::{PageService, PublishedPage, SavePageInput};
use axum::{
    extract::{rejection::JsonRejection, Path},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckSlugRequest {
    /// Candidate slug
    #[serde(default)]
    #[schema(value_type = String)]
    pub slug: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckSlugResponse {
    /// Whether no page uses the slug yet
    pub available: bool,
    /// The slug after trimming and lowercasing
    pub slug: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SavePageRequest {
    /// Requested slug; normalized before saving
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    /// Page title (max 200 characters)
    #[validate(length(max = 200))]
    pub title: Option<String>,
    /// Page description (max 500 characters)
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Profile, components and theme
    #[schema(value_type = Object)]
    pub config: PageConfig,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageSummaryResponse {
    /// Page ID
    pub id: i32,
    /// Public slug
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Whether the page is publicly visible
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<PageModel> for PageSummaryResponse {
    fn from(p: PageModel) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            description: p.description,
            is_published: p.is_published,
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageOwnerResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMetaResponse {
    /// Title for the document head, falling back to the owner's name
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicPageResponse {
    pub id: i32,
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Page document with components in display order
    #[schema(value_type = Object)]
    pub config: PageConfig,
    /// Theme with defaults filled in
    #[schema(value_type = Object)]
    pub theme: ResolvedTheme,
    pub owner: PageOwnerResponse,
    pub meta: PageMetaResponse,
    pub updated_at: String,
}

impl From<PublishedPage> for PublicPageResponse {
    fn from(p: PublishedPage) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            description: p.description,
            config: p.config,
            theme: p.theme,
            owner: PageOwnerResponse {
                id: p.owner.id,
                name: p.owner.name,
                image: p.owner.image,
            },
            meta: PageMetaResponse {
                title: p.meta_title,
                description: p.meta_description,
            },
            updated_at: p.updated_at.to_string(),
        }
    }
}

fn make_page_service(db: DatabaseConnection, cache: Option<CacheService>) -> PageService {
    let service = PageService::new(db);
    match cache {
        Some(c) => service.with_cache(c),
        None => service,
    }
}

/// Empty strings are stored as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/v1/check-slug",
    security(("jwt_token" = [])),
    request_body = CheckSlugRequest,
    responses(
        (status = 200, description = "Availability of the slug", body = CheckSlugResponse),
        (status = 400, description = "Missing, empty or reserved slug", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "pages"
)]
pub async fn check_slug(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    payload: Result<Json<CheckSlugRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let invalid = || AppError::Validation("Invalid slug".to_string());
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected check-slug body: {e}");
        invalid()
    })?;
    let raw = payload.slug.as_str().ok_or_else(invalid)?;

    let service = PageService::new(db);
    let (slug, available) = service.check_slug(raw).await?;

    Ok(ApiResponse::ok(CheckSlugResponse { available, slug }))
}

#[utoipa::path(
    put,
    path = "/api/v1/pages",
    security(("jwt_token" = [])),
    request_body = SavePageRequest,
    responses(
        (status = 200, description = "Page saved and published", body = PageSummaryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 409, description = "Slug is already taken", body = AppError),
    ),
    tag = "pages"
)]
pub async fn save_page(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Json(payload): Json<SavePageRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = make_page_service(db, cache.map(|c| c.0));
    let page = service
        .save(
            auth_user.user_id,
            SavePageInput {
                slug: payload.slug,
                title: non_blank(payload.title),
                description: non_blank(payload.description),
                config: payload.config,
            },
        )
        .await?;

    Ok(ApiResponse::with_message(
        PageSummaryResponse::from(page),
        "Page published",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Pages owned by the caller", body = Vec<PageSummaryResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "pages"
)]
pub async fn list_my_pages(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = PageService::new(db);
    let pages = service.list_for_user(auth_user.user_id).await?;
    let response: Vec<PageSummaryResponse> =
        pages.into_iter().map(PageSummaryResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Published page", body = PublicPageResponse),
        (status = 404, description = "Page not found", body = AppError),
    ),
    tag = "pages"
)]
pub async fn get_public_page(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = make_page_service(db, cache.map(|c| c.0));
    let page = service.get_published(&slug).await?;
    Ok(ApiResponse::ok(PublicPageResponse::from(page)))
}
