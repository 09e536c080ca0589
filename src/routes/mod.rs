use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let otp = otp_routes(&rate_limit_config);
    let public_pages = public_page_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    otp.merge(public_pages).merge(protected)
}

/// Sign-in routes: OTP issue/verify and token refresh.
fn otp_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/send-otp", routing::post(handlers::send_otp))
        .route("/auth/verify-otp", routing::post(handlers::verify_otp))
        .route("/auth/refresh", routing::post(handlers::refresh_token));

    with_optional_rate_limit(router, config.enabled, config.otp)
}

/// Published page lookups.
fn public_page_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new().route(
        "/pages/{slug}",
        routing::get(handlers::page::get_public_page),
    );

    with_optional_rate_limit(router, config.enabled, config.public_pages)
}

/// Routes that need a signed-in caller.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::logout))
        .route("/check-slug", routing::post(handlers::page::check_slug))
        .route(
            "/pages",
            routing::get(handlers::page::list_my_pages).put(handlers::page::save_page),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
