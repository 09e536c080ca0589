use axum::{extract::Extension, middleware, response::IntoResponse, routing::get, Json, Router};
use linkbio::{config, migration, routes, services, utils};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use services::cache::CacheService;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        linkbio::handlers::auth::send_otp,
        linkbio::handlers::auth::verify_otp,
        linkbio::handlers::auth::refresh_token,
        linkbio::handlers::auth::get_current_user,
        linkbio::handlers::auth::logout,
        // Page routes
        linkbio::handlers::page::check_slug,
        linkbio::handlers::page::save_page,
        linkbio::handlers::page::list_my_pages,
        linkbio::handlers::page::get_public_page,
    ),
    components(
        schemas(
            linkbio::response::ApiResponse<serde_json::Value>,
            linkbio::error::AppError,
            // Auth
            linkbio::handlers::auth::SendOtpRequest,
            linkbio::handlers::auth::VerifyOtpRequest,
            linkbio::handlers::auth::RefreshTokenRequest,
            linkbio::handlers::auth::AuthResponse,
            linkbio::handlers::auth::TokenResponse,
            linkbio::handlers::auth::UserResponse,
            // Pages
            linkbio::handlers::page::CheckSlugRequest,
            linkbio::handlers::page::CheckSlugResponse,
            linkbio::handlers::page::SavePageRequest,
            linkbio::handlers::page::PageSummaryResponse,
            linkbio::handlers::page::PublicPageResponse,
            linkbio::handlers::page::PageOwnerResponse,
            linkbio::handlers::page::PageMetaResponse,
        )
    ),
    tags(
        (name = "auth", description = "One-time passcode sign-in and sessions"),
        (name = "pages", description = "Link-in-bio page operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkbio=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let (app_env, jwt_config, database_url) = validate_config()?;

    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!(
        "Starting linkbio v{} ({})...",
        env!("CARGO_PKG_VERSION"),
        app_env
    );

    let db = config::database::connect(&database_url).await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    // Redis/Cache is optional - graceful degradation if unavailable
    let cache = match config::redis::get_redis().await {
        Ok(conn) => {
            tracing::info!("Redis connected successfully");
            Some(CacheService::new(conn))
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, running without cache: {}", e);
            None
        }
    };

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, verification codes will only be logged");
    }

    let mut app = create_app()
        .layer(Extension(db))
        .layer(Extension(email_service));

    if let Some(cache) = cache {
        app = app.layer(Extension(cache));
    }

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<(config::app::AppEnv, config::jwt::JwtConfig, String)> {
    let app_env = config::app::AppEnv::from_env()?;
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // Checked here for an early error; the connection is opened later
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable must be set"))?;

    Ok((app_env, jwt_config, database_url))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        // Cookie sessions need an explicit origin list.
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(
            linkbio::middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "linkbio",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
