#![allow(dead_code)]

use linkbio::models::{verification_token, VerificationToken};
use reqwest::Client;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var("APP_ENV", "development");
        std::env::set_var(
            "AUTH_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = linkbio::config::jwt::JwtConfig::from_env().unwrap();
        let _ = linkbio::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

/// Serve the API on a random port over a fresh database.
/// A shared `TEST_DATABASE_URL` is wiped on every call, so run those
/// suites with `--test-threads=1`.
pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url =
        std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    let db = linkbio::config::database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    linkbio::migration::Migrator::fresh(&db)
        .await
        .expect("Failed to run migrations");

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(linkbio::routes::create_routes())
        .layer(axum::middleware::from_fn(
            linkbio::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(
            linkbio::services::email::EmailService::disabled(),
        ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

/// The code currently stored for `email`, read straight from the database
/// since delivery is disabled in tests.
pub async fn stored_code(app: &TestApp, email: &str) -> Option<String> {
    VerificationToken::find()
        .filter(verification_token::Column::Email.eq(email))
        .one(&app.db)
        .await
        .expect("Failed to query verification tokens")
        .map(|t| t.token)
}

pub async fn send_otp(app: &TestApp, email: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/send-otp"))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .expect("Failed to send OTP request")
}

pub async fn verify_otp(app: &TestApp, email: &str, code: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/verify-otp"))
        .json(&serde_json::json!({ "email": email, "code": code }))
        .send()
        .await
        .expect("Failed to send verify request")
}

/// Sign in through the OTP flow and return (user_id, access token).
pub async fn login_user(app: &TestApp, email: &str) -> (i32, String) {
    let resp = send_otp(app, email).await;
    assert_eq!(resp.status(), 200, "send-otp failed for {email}");

    let code = stored_code(app, &email.trim().to_lowercase())
        .await
        .unwrap_or_else(|| panic!("No code stored for {email}"));

    let resp = verify_otp(app, email, &code).await;
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse verify response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to sign in '{email}': status={status}, body={body}");
    }

    let user_id = body["data"]["user"]["id"]
        .as_i64()
        .unwrap_or_else(|| panic!("Response missing user id: {body}")) as i32;
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Response missing token: {body}"))
        .to_string();
    (user_id, token)
}

/// A page document with `links` link components.
pub fn page_config(name: &str, links: usize) -> serde_json::Value {
    let components: Vec<_> = (0..links)
        .map(|i| {
            serde_json::json!({
                "id": format!("link-{i}"),
                "order": i,
                "type": "link",
                "title": format!("Link {i}"),
                "url": "https://example.com"
            })
        })
        .collect();

    serde_json::json!({
        "profile": { "name": name, "bio": "Hello" },
        "components": components
    })
}

pub async fn save_page(
    app: &TestApp,
    token: &str,
    body: serde_json::Value,
) -> reqwest::Response {
    app.client
        .put(app.url("/pages"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to save page")
}
